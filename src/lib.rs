pub mod columns;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod model;
pub mod parse;
pub mod render;
pub mod wait;

pub use config::{CaptureConfig, Config, WaitConfig};
pub use error::ExtractionError;
pub use export::{encode_png, generate_filename, save_png, save_to_csv};
pub use extract::{assemble, capture_document, extract_table, read_global_stats};
pub use fetch::{DocumentSource, FileSource, StaticSource, UrlSource};
pub use filter::{compute_breadth, compute_movers, filter_coins, is_stable_like, IgnoreSet, MarketView};
pub use model::{CaptureResponse, CoinRecord, FilterOptions, MarketSnapshot, RenderOptions};
pub use render::{render, RasterCanvas};
pub use wait::{capture, wait_for_table};
