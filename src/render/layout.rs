//! Summary card layout.
//!
//! Panels stack top to bottom: header, stat cards, coin table, movers and
//! footer. Everything is positioned from fixed offsets, so the same snapshot
//! and options always produce the same drawing calls. Empty fields are drawn
//! as placeholders instead of failing.

use crate::filter::MarketView;
use crate::model::{ChangeColumn, CoinRecord, MarketSnapshot, Movers, RenderOptions, DEFAULT_HEADLINE};
use crate::render::canvas::{Canvas, Color, Rect, TextStyle};
use crate::render::font;

pub const PLACEHOLDER: &str = "—";
pub const NOT_AVAILABLE: &str = "N/A";
pub const FOOTER_CREDIT: &str = "Generated by CMC Market Snap";

pub const TEXT: Color = Color::rgb(0xe8, 0xf0, 0xff);
pub const MUTED: Color = Color::rgba(0xe8, 0xf0, 0xff, 173);
pub const POSITIVE: Color = Color::rgb(0x5c, 0xff, 0xb1);
pub const NEGATIVE: Color = Color::rgb(0xff, 0x6b, 0x6b);
pub const NEUTRAL: Color = MUTED;
pub const DEFAULT_ACCENT_COLOR: Color = Color::rgb(0xec, 0x67, 0x14);

const BG_FROM: Color = Color::rgb(0x0b, 0x12, 0x20);
const BG_TO: Color = Color::rgb(0x07, 0x0b, 0x14);
const CARD_FILL: Color = Color::rgba(255, 255, 255, 15);
const PANEL_FILL: Color = Color::rgba(255, 255, 255, 13);
const STROKE: Color = Color::rgba(255, 255, 255, 20);
const CREDIT: Color = Color::rgba(0xe8, 0xf0, 0xff, 115);
const WATERMARK: Color = Color::rgba(0xe8, 0xf0, 0xff, 153);

const MARGIN: f32 = 70.0;

const CARDS_TOP: f32 = 175.0;
const CARD_HEIGHT: f32 = 140.0;
const CARD_GAP: f32 = 14.0;
const CARD_TEXT_INSET: f32 = 30.0;

const TABLE_TOP: f32 = 350.0;
const TABLE_HEIGHT: f32 = 560.0;
const TABLE_ROWS: usize = 6;
const ROW_HEIGHT: f32 = 70.0;
/// Offsets from the table's text column, which sits 30px inside the panel.
const ASSET_MAX_WIDTH: f32 = 300.0;
const PRICE_RIGHT: f32 = 500.0;
const CHANGE_RIGHTS: [f32; 3] = [640.0, 760.0, 880.0];
const CHANGE_MAX_WIDTH: f32 = 116.0;

const MOVERS_GAP: f32 = 20.0;
const MOVERS_HEIGHT: f32 = 200.0;
const MOVERS_LINE: f32 = 32.0;

/// Color for a change cell, decided only by its leading character: `-` is
/// negative, anything else with a value is positive, placeholders are
/// neutral. `"-0.00%"` is therefore red and `"0.00%"` green.
pub fn change_color(value: &str) -> Color {
    let value = value.trim();
    if value.is_empty() || value == PLACEHOLDER || value == NOT_AVAILABLE {
        NEUTRAL
    } else if value.starts_with('-') {
        NEGATIVE
    } else {
        POSITIVE
    }
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder
    } else {
        trimmed
    }
}

fn draw_fitted<C: Canvas + ?Sized>(
    canvas: &mut C,
    text: &str,
    x: f32,
    y: f32,
    max_width: f32,
    style: TextStyle,
) {
    let fitted = font::ellipsize(text, max_width, |s| canvas.measure_text(s, style.size));
    canvas.draw_text(&fitted, x, y, style);
}

fn panel<C: Canvas + ?Sized>(canvas: &mut C, rect: Rect, radius: f32, fill: Color) {
    canvas.fill_rounded_rect(rect, radius, fill);
    canvas.stroke_rounded_rect(rect, radius, 2.0, STROKE);
}

/// Label for the asset column: ticker then name.
fn asset_label(coin: &CoinRecord) -> String {
    let parts: Vec<&str> = [coin.symbol.trim(), coin.name.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        parts.join("  ")
    }
}

/// Draw the summary card for `snapshot` onto `canvas`, replacing its contents.
pub fn render<C: Canvas + ?Sized>(canvas: &mut C, snapshot: &MarketSnapshot, options: &RenderOptions) {
    let view = MarketView::new(snapshot, &options.filter);
    let accent = Color::parse_css(&options.accent).unwrap_or(DEFAULT_ACCENT_COLOR);

    canvas.fill_linear_gradient(BG_FROM, BG_TO);
    draw_header(canvas, snapshot, options);
    draw_stat_cards(canvas, snapshot, &view, accent);
    draw_coin_table(canvas, snapshot, &view.coins);
    draw_movers(canvas, &view.movers);
    draw_footer(canvas, snapshot, &view, options, accent);
}

fn draw_header<C: Canvas + ?Sized>(canvas: &mut C, snapshot: &MarketSnapshot, options: &RenderOptions) {
    let content_width = canvas.width() as f32 - MARGIN * 2.0;
    let headline = or_placeholder(&options.headline, DEFAULT_HEADLINE);
    draw_fitted(canvas, headline, MARGIN, 60.0, content_width, TextStyle::new(54.0, TEXT));

    let source = format!(
        "Source: {} • {}",
        or_placeholder(snapshot.source(), NOT_AVAILABLE),
        snapshot.captured_at().format("%Y-%m-%d %H:%M UTC")
    );
    draw_fitted(canvas, &source, MARGIN, 125.0, content_width, TextStyle::new(22.0, MUTED));
}

fn draw_stat_cards<C: Canvas + ?Sized>(
    canvas: &mut C,
    snapshot: &MarketSnapshot,
    view: &MarketView,
    accent: Color,
) {
    let stats = snapshot.stats();
    let btc = snapshot.coin("BTC");
    let btc_price = btc.map(|c| c.price.as_str()).unwrap_or_default();
    let btc_change = btc.map(|c| c.change_24h.as_str()).unwrap_or_default();

    let cards = [
        ("Market Cap", or_placeholder(&stats.market_cap, NOT_AVAILABLE).to_string()),
        ("BTC Price", or_placeholder(btc_price, NOT_AVAILABLE).to_string()),
        ("BTC 24h", or_placeholder(btc_change, NOT_AVAILABLE).to_string()),
        ("Fear & Greed", or_placeholder(&stats.fear_greed, NOT_AVAILABLE).to_string()),
        ("Breadth", format!("↑ {}  ↓ {}", view.breadth.up, view.breadth.down)),
    ];

    let count = cards.len() as f32;
    let card_width =
        (canvas.width() as f32 - MARGIN * 2.0 - CARD_GAP * (count - 1.0)) / count;
    let text_width = card_width - CARD_TEXT_INSET - 10.0;

    for (i, (label, value)) in cards.iter().enumerate() {
        let x = MARGIN + i as f32 * (card_width + CARD_GAP);
        let rect = Rect::new(x, CARDS_TOP, card_width, CARD_HEIGHT);
        panel(canvas, rect, 22.0, CARD_FILL);
        canvas.fill_rounded_rect(
            Rect::new(x + 12.0, CARDS_TOP + 14.0, 8.0, CARD_HEIGHT - 28.0),
            4.0,
            accent,
        );

        let text_x = x + CARD_TEXT_INSET;
        draw_fitted(canvas, label, text_x, CARDS_TOP + 26.0, text_width, TextStyle::new(15.0, MUTED));
        draw_fitted(canvas, value, text_x, CARDS_TOP + 70.0, text_width, TextStyle::new(18.0, TEXT));
    }
}

fn draw_coin_table<C: Canvas + ?Sized>(canvas: &mut C, snapshot: &MarketSnapshot, coins: &[CoinRecord]) {
    let rect = Rect::new(
        MARGIN,
        TABLE_TOP,
        canvas.width() as f32 - MARGIN * 2.0,
        TABLE_HEIGHT,
    );
    panel(canvas, rect, 28.0, PANEL_FILL);
    canvas.draw_text("Top Coins", rect.x + 30.0, rect.y + 26.0, TextStyle::new(28.0, TEXT));

    let columns: Vec<ChangeColumn> = snapshot
        .table_columns()
        .available()
        .into_iter()
        .take(CHANGE_RIGHTS.len())
        .collect();

    let hx = rect.x + 30.0;
    let hy = rect.y + 78.0;
    let header = TextStyle::new(20.0, MUTED);
    canvas.draw_text("Asset", hx, hy, header);
    canvas.draw_text("Price", hx + PRICE_RIGHT, hy, header.right());
    for (column, right) in columns.iter().zip(CHANGE_RIGHTS) {
        canvas.draw_text(column.label(), hx + right, hy, header.right());
    }

    let price_max_width = PRICE_RIGHT - ASSET_MAX_WIDTH - 24.0;
    for slot in 0..TABLE_ROWS {
        let y = hy + 46.0 + slot as f32 * ROW_HEIGHT;
        if slot > 0 {
            canvas.fill_rect(Rect::new(hx, y - 16.0, rect.w - 60.0, 1.0), STROKE);
        }

        let Some(coin) = coins.get(slot) else {
            // keep the grid shape when the page gave fewer rows
            let filler = TextStyle::new(24.0, NEUTRAL);
            canvas.draw_text(PLACEHOLDER, hx, y, filler);
            canvas.draw_text(PLACEHOLDER, hx + PRICE_RIGHT, y + 2.0, filler.right());
            for right in CHANGE_RIGHTS.iter().take(columns.len()) {
                canvas.draw_text(PLACEHOLDER, hx + right, y + 2.0, filler.right());
            }
            continue;
        };

        draw_fitted(canvas, &asset_label(coin), hx, y, ASSET_MAX_WIDTH, TextStyle::new(24.0, TEXT));
        draw_fitted(
            canvas,
            or_placeholder(&coin.price, PLACEHOLDER),
            hx + PRICE_RIGHT,
            y + 2.0,
            price_max_width,
            TextStyle::new(22.0, TEXT).right(),
        );
        for (column, right) in columns.iter().zip(CHANGE_RIGHTS) {
            let value = or_placeholder(coin.change(*column), PLACEHOLDER);
            draw_fitted(
                canvas,
                value,
                hx + right,
                y + 2.0,
                CHANGE_MAX_WIDTH,
                TextStyle::new(22.0, change_color(value)).right(),
            );
        }
    }
}

fn mover_line(coin: &CoinRecord) -> String {
    let label = or_placeholder(&coin.symbol, or_placeholder(&coin.name, PLACEHOLDER));
    format!("{}  {}", label, coin.change_24h.trim())
}

fn draw_movers<C: Canvas + ?Sized>(canvas: &mut C, movers: &Movers) {
    let rect = Rect::new(
        MARGIN,
        TABLE_TOP + TABLE_HEIGHT + MOVERS_GAP,
        canvas.width() as f32 - MARGIN * 2.0,
        MOVERS_HEIGHT,
    );
    panel(canvas, rect, 26.0, PANEL_FILL);
    canvas.draw_text("Top Movers (24h)", rect.x + 30.0, rect.y + 24.0, TextStyle::new(26.0, TEXT));

    let half = rect.w / 2.0;
    let lists = [
        ("Gainers", rect.x + 30.0, &movers.gainers, POSITIVE),
        ("Losers", rect.x + half + 10.0, &movers.losers, NEGATIVE),
    ];
    for (title, x, coins, color) in lists {
        canvas.draw_text(title, x, rect.y + 70.0, TextStyle::new(20.0, MUTED));
        if coins.is_empty() {
            canvas.draw_text(PLACEHOLDER, x, rect.y + 100.0, TextStyle::new(22.0, NEUTRAL));
            continue;
        }
        for (i, coin) in coins.iter().enumerate() {
            draw_fitted(
                canvas,
                &mover_line(coin),
                x,
                rect.y + 100.0 + i as f32 * MOVERS_LINE,
                half - 40.0,
                TextStyle::new(22.0, color),
            );
        }
    }
}

fn draw_footer<C: Canvas + ?Sized>(
    canvas: &mut C,
    snapshot: &MarketSnapshot,
    view: &MarketView,
    options: &RenderOptions,
    accent: Color,
) {
    let width = canvas.width() as f32;
    let height = canvas.height() as f32;
    let content_width = width - MARGIN * 2.0;

    let btc_change = snapshot
        .coin("BTC")
        .map(|c| c.change_24h.as_str())
        .unwrap_or_default();
    let mood = format!(
        "Market Mood: {} • BTC {} • Breadth {}/{}",
        view.breadth.mood().label(),
        or_placeholder(btc_change, NOT_AVAILABLE),
        view.breadth.up,
        view.breadth.down
    );
    draw_fitted(canvas, &mood, MARGIN, height - 95.0, content_width, TextStyle::new(20.0, MUTED));

    canvas.draw_text(FOOTER_CREDIT, MARGIN, height - 58.0, TextStyle::new(18.0, CREDIT));
    let watermark = options.watermark.trim();
    if !watermark.is_empty() {
        draw_fitted(
            canvas,
            watermark,
            width - MARGIN,
            height - 58.0,
            content_width / 2.0,
            TextStyle::new(22.0, WATERMARK).right(),
        );
    }

    canvas.fill_rect(Rect::new(MARGIN, height - 30.0, 220.0, 6.0), accent);
}
