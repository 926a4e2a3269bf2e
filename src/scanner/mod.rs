mod walk;

pub use walk::DocumentLoader;
