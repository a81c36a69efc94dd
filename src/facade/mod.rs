pub mod root;

pub use root::RootStore;
