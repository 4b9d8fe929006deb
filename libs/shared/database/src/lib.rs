pub mod gateway;
pub mod memory;
pub mod repository;
pub mod state;
pub mod supabase;

pub use gateway::{OrderBy, Predicate, Query, StoreGateway};
pub use memory::{InMemoryStore, StoreOp};
pub use repository::Repository;
pub use state::AppState;
pub use supabase::SupabaseStore;
