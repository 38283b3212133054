//! Port for receivers of loaded images.

use crate::domain::entities::LoadTicket;
use crate::domain::errors::LoadError;

/// Receives the outcome of a load request on the draining thread.
///
/// Exactly one of the two methods is called per delivered ticket.
pub trait ImageConsumer: Send + Sync {
    /// Called with the decoded image.
    fn on_image(&self, ticket: LoadTicket, image: image::DynamicImage);

    /// Called when the load failed or the payload could not be decoded.
    fn on_error(&self, ticket: LoadTicket, error: &LoadError);
}
