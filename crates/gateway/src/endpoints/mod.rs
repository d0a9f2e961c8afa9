//! # Gatewayエンドポイント

pub mod health;
pub mod image;
pub mod logs;
pub mod orders;
pub mod send;

pub use health::{handle_check_limits, handle_root};
pub use image::{handle_fetch_image, handle_image};
pub use logs::handle_docusign_logs;
pub use orders::{
    handle_availability, handle_order, handle_product, handle_proof_required,
};
pub use send::handle_send_to_docusign;
