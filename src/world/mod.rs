//! World module - meshes, placed objects and the per-frame render list
//!
//! - Immutable shared models, loaded from PLG files or built in
//! - Objects with their own transform and vertex scratch buffer
//! - Render list carried through camera, projection and screen space
//! - RON scene descriptions

mod model;
mod plg;
mod object;
mod render_list;
mod scene;

pub use model::*;
pub use plg::*;
pub use object::*;
pub use render_list::*;
pub use scene::*;
