use crate::address::AddressResult;
use crate::geocoding::GeocodingService;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

/// Drives a [`GeocodingService`] over a list of locations, one at a time.
///
/// Results come back in input order, one per location. A provider that panics
/// on an item only loses that item. After every item, including the last one,
/// the batch sleeps for `request_delay` to stay under the provider's rate limit.
pub struct BatchGeocoder<'a> {
    service: &'a dyn GeocodingService,
    request_delay: Duration,
}

impl<'a> BatchGeocoder<'a> {
    pub fn new(service: &'a dyn GeocodingService, request_delay: Duration) -> Self {
        Self {
            service,
            request_delay,
        }
    }

    pub fn batch_resolve(&self, locations: &[String]) -> Vec<AddressResult> {
        let mut results = Vec::with_capacity(locations.len());

        for location in locations {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.service.resolve(location)));

            let result = match outcome {
                Ok(mut result) => {
                    if result.origin != *location {
                        log::warn!(
                            "{} returned origin {:?} for {:?}; keeping the input value",
                            self.service.name(),
                            result.origin,
                            location
                        );
                        result.origin = location.clone();
                    }
                    log::info!("Processed {} ({})", location, result.status);
                    result
                }
                Err(payload) => {
                    log::error!("Error processing {}: {}", location, panic_message(payload.as_ref()));
                    AddressResult::error(location)
                }
            };
            results.push(result);

            if !self.request_delay.is_zero() {
                thread::sleep(self.request_delay);
            }
        }

        results
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
