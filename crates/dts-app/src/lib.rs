// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod forms;
pub mod ids;
pub mod list_view;
pub mod model;
pub mod outcome;
pub mod paging;
pub mod pipeline;
pub mod rows;
pub mod selection;
pub mod state;

pub use forms::*;
pub use ids::*;
pub use list_view::*;
pub use model::*;
pub use outcome::*;
pub use paging::*;
pub use pipeline::*;
pub use rows::*;
pub use selection::*;
pub use state::*;
