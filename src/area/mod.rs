pub mod collection;
pub use collection::AreaCollection;
pub mod io;
pub mod model;
pub use model::Area;
pub use model::AreaLabel;
