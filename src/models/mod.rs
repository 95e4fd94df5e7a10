// Model exports
pub mod catalog;
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{GameSystem, NewPairing, Pairing, PairingStatus, Player, PublishState, Signup, SignupDetails};
pub use requests::{
    DeleteIdsRequest, GeneratePairingsRequest, HistoryQuery, MergeThreeWayRequest, PublishRequest,
    SignupRequest, UnlockRequest, WeekQuery,
};
pub use responses::{
    AdminPairingRow, AdminPairingsResponse, Branding, DeletedResponse, ErrorResponse, GenerateResponse,
    HealthResponse, HistoryResponse, MergeResponse, MetaResponse, PlayersResponse, PublicPairingRow,
    PublicPairingsResponse, PublishResponse, SessionResponse, SignupResponse, SignupsResponse,
    SystemCatalog,
};
