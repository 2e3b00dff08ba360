pub mod content_hash;
pub mod redirect;

pub use redirect::safe_redirect_target;
