// Service exports
pub mod appwrite;
pub mod geocoder;
pub mod ports;

pub use appwrite::{AppwriteClient, AppwriteCollections, AppwriteError};
pub use geocoder::{GeocodeError, Geocoder, ZippopotamClient};
pub use ports::{IdentityProvider, ImageStore, ProfileStore, ServiceError};
