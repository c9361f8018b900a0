pub mod adoption;
pub mod animal;
pub mod contact;
pub mod donation;
pub mod photo;
pub mod user;

pub use adoption::{Adoption, AdoptionRequest, RequestStatus};
pub use animal::{Animal, AnimalStats, AnimalStatus, AnimalSummary, AnimalWithPhotos};
pub use contact::ContactMessage;
pub use donation::Donation;
pub use photo::Photo;
pub use user::{AccountStatus, User, UserStats};
