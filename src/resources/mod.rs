//! Managed resource definitions.

mod group;
mod group_membership;
mod permissions;
mod project_features;
mod resource_authorization;
mod serviceendpoint;

pub use group::GroupResource;
pub use group_membership::GroupMembershipResource;
pub use permissions::{
    GitPermissions, PermissionResource, PermissionTokenKind, ServiceEndpointPermissions,
};
pub use project_features::ProjectFeaturesResource;
pub use resource_authorization::ResourceAuthorizationResource;
pub use serviceendpoint::{
    EndpointKind, EndpointResource, GitHubEndpoint, KubernetesEndpoint, SonarqubeEndpoint,
};
