// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod cache;
pub mod error;
pub mod filter;
pub mod ids;
pub mod model;
pub mod pagination;
pub mod state;
pub mod text;
pub mod timing;
pub mod viewport;
pub mod window;

pub use cache::*;
pub use error::*;
pub use filter::*;
pub use ids::*;
pub use model::*;
pub use pagination::*;
pub use state::*;
pub use text::*;
pub use timing::*;
pub use viewport::*;
pub use window::*;
