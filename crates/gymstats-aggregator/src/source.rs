//! Where the aggregator's input comes from

use gymstats_common::{Dataset, Result};
use std::borrow::Cow;

/// Supplies the attendance events, subscription periods and member profiles
/// a snapshot is computed from
pub trait DatasetSource: Send + Sync {
    /// Fetch the current collections
    fn fetch(&self) -> Result<Cow<'_, Dataset>>;
}

impl DatasetSource for Dataset {
    fn fetch(&self) -> Result<Cow<'_, Dataset>> {
        Ok(Cow::Borrowed(self))
    }
}

impl<S: DatasetSource + ?Sized> DatasetSource for std::sync::Arc<S> {
    fn fetch(&self) -> Result<Cow<'_, Dataset>> {
        (**self).fetch()
    }
}
