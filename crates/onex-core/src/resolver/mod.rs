// crates/onex-core/src/resolver/mod.rs
// ============================================================================
// Module: Onex Resolver
// Description: Tiered resolution engine and configuration surfaces.
// Purpose: Expose the canonical resolution path over frozen snapshots.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The resolver module pairs the tier escalation engine with its
//! YAML-declared configuration. Both operate purely over immutable inputs;
//! callers obtain snapshots and registries elsewhere and pass them in.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod config;
pub mod engine;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::DependencySpec;
pub use config::ResolverContract;
pub use config::TieredResolutionConfig;
pub use config::TrustDomainConfig;
pub use engine::ResolverContext;
pub use engine::ResolverError;
pub use engine::TieredCapabilityResolver;
