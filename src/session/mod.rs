pub mod model;
pub use model::Interaction;
pub use model::MapView;
pub use model::SessionState;
pub use model::Transition;
pub mod store;
pub use store::SessionStore;
