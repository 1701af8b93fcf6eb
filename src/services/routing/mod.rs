// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod contracts;
pub mod optimizer;
pub mod paths;
pub mod protocols;
pub mod route;
pub mod strategy;

pub use optimizer::{RouteOptimizer, RoutingOptions};
pub use route::{FeeTier, PoolKey, Protocol, Route, RouteArtifacts, StableRoute};
pub use strategy::{RouteStrategy, RoutingStrategy};
