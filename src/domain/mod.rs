pub mod types;

pub use types::{Alert, Availability, FetchedPage, NotificationOutcome, Reason};
