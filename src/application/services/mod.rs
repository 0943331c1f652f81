pub mod link_service;
pub mod lookup;
pub mod redirect_service;

pub use link_service::LinkService;
pub use lookup::PreparedLookup;
pub use redirect_service::{RedirectService, VANITY_QUERY};
