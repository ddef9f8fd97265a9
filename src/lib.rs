use wasm_bindgen::prelude::*;

pub mod logging;

mod bounds;
mod config;
mod error;
mod projection;
mod raster;
mod security;
mod session;
mod utils;

pub use bounds::*;
pub use config::*;
pub use error::*;
pub use projection::*;
pub use raster::*;
pub use security::*;
pub use session::*;
pub use utils::*;

// Initialize WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    crate::console_log!("Whale risk map WASM module initialized");
}
