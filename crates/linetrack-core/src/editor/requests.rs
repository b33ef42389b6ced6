// ── Editor requests and outcomes ──
//
// A `Request` is a remote call the editor wants made; an `Outcome` is the
// same call with its result attached. `perform` is the only place the two
// meet a backend.

use linetrack_api::{Business, RecordId, Station};
use tracing::debug;

use crate::backend::LineBackend;
use crate::error::CoreError;

/// A remote call requested by the settings editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ListBusinesses,
    ListStations {
        business_id: RecordId,
    },
    CreateBusiness {
        name: String,
    },
    RenameBusiness {
        id: RecordId,
        name: String,
    },
    CreateStation {
        business_id: RecordId,
        name: String,
    },
    RenameStation {
        id: RecordId,
        business_id: RecordId,
        name: String,
    },
    DeleteStation {
        id: RecordId,
        business_id: RecordId,
    },
}

impl Request {
    /// Whether this request changes server state (and was user-initiated).
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::ListBusinesses | Self::ListStations { .. })
    }
}

/// A finished request and its result.
#[derive(Debug, Clone)]
pub enum Outcome {
    BusinessesLoaded(Result<Vec<Business>, CoreError>),
    StationsLoaded {
        business_id: RecordId,
        result: Result<Vec<Station>, CoreError>,
    },
    BusinessCreated {
        name: String,
        result: Result<Business, CoreError>,
    },
    BusinessRenamed {
        id: RecordId,
        name: String,
        result: Result<(), CoreError>,
    },
    StationCreated {
        business_id: RecordId,
        name: String,
        result: Result<RecordId, CoreError>,
    },
    StationRenamed {
        id: RecordId,
        business_id: RecordId,
        name: String,
        result: Result<(), CoreError>,
    },
    StationDeleted {
        id: RecordId,
        business_id: RecordId,
        result: Result<(), CoreError>,
    },
}

impl Outcome {
    /// The request that produced this outcome.
    pub fn request(&self) -> Request {
        match self {
            Self::BusinessesLoaded(_) => Request::ListBusinesses,
            Self::StationsLoaded { business_id, .. } => Request::ListStations {
                business_id: business_id.clone(),
            },
            Self::BusinessCreated { name, .. } => Request::CreateBusiness { name: name.clone() },
            Self::BusinessRenamed { id, name, .. } => Request::RenameBusiness {
                id: id.clone(),
                name: name.clone(),
            },
            Self::StationCreated {
                business_id, name, ..
            } => Request::CreateStation {
                business_id: business_id.clone(),
                name: name.clone(),
            },
            Self::StationRenamed {
                id,
                business_id,
                name,
                ..
            } => Request::RenameStation {
                id: id.clone(),
                business_id: business_id.clone(),
                name: name.clone(),
            },
            Self::StationDeleted {
                id, business_id, ..
            } => Request::DeleteStation {
                id: id.clone(),
                business_id: business_id.clone(),
            },
        }
    }

    /// The error, if the request failed.
    pub fn error(&self) -> Option<&CoreError> {
        match self {
            Self::BusinessesLoaded(r) => r.as_ref().err(),
            Self::StationsLoaded { result, .. } => result.as_ref().err(),
            Self::BusinessCreated { result, .. } => result.as_ref().err(),
            Self::StationCreated { result, .. } => result.as_ref().err(),
            Self::BusinessRenamed { result, .. }
            | Self::StationRenamed { result, .. }
            | Self::StationDeleted { result, .. } => result.as_ref().err(),
        }
    }
}

/// Run `request` against `backend`.
pub async fn perform<B: LineBackend>(backend: &B, request: Request) -> Outcome {
    debug!(?request, "performing editor request");
    match request {
        Request::ListBusinesses => Outcome::BusinessesLoaded(backend.list_businesses().await),
        Request::ListStations { business_id } => {
            let result = backend.list_stations(&business_id).await;
            Outcome::StationsLoaded {
                business_id,
                result,
            }
        }
        Request::CreateBusiness { name } => {
            let result = backend.create_business(&name).await;
            Outcome::BusinessCreated { name, result }
        }
        Request::RenameBusiness { id, name } => {
            let result = backend.rename_business(&id, &name).await;
            Outcome::BusinessRenamed { id, name, result }
        }
        Request::CreateStation { business_id, name } => {
            let result = backend.create_station(&business_id, &name).await;
            Outcome::StationCreated {
                business_id,
                name,
                result,
            }
        }
        Request::RenameStation {
            id,
            business_id,
            name,
        } => {
            let result = backend.rename_station(&id, &name).await;
            Outcome::StationRenamed {
                id,
                business_id,
                name,
                result,
            }
        }
        Request::DeleteStation { id, business_id } => {
            let result = backend.delete_station(&id).await;
            Outcome::StationDeleted {
                id,
                business_id,
                result,
            }
        }
    }
}
