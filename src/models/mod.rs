use uuid::Uuid;

pub mod item;
pub mod refresh;
pub mod system_setting;

// Re-exports for convenience
pub use item::*;
pub use refresh::*;
pub use system_setting::*;

// Helper function to generate UUIDs in the format expected by the database
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}
