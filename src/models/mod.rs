pub mod assignment;
pub mod remote;

pub use assignment::{Assignment, Milestone, NewAssignmentRequest, Origin, RemoteId, UpdateAssignmentRequest};
pub use remote::{RemoteAssignment, RemoteSnapshot};
