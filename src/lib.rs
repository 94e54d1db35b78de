// Module layout (Clean Architecture style)
// - bootstrap: configuration and startup wiring
// - domain: the span/link annotation model
// - application: ports, domain services (segmenter, auto-linker, scoring,
//   definition search) and use cases
// - infrastructure: Postgres repositories, filesystem document store
// - presentation: HTTP handlers and routing

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
