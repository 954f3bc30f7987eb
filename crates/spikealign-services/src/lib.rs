// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# spikealign Service Layer

The stable application boundary between the analysis engine and whatever
stores the data - defines storage-agnostic collaborator traits plus the
batch runner that fans units out over a worker pool.

## Architecture

```text
┌─────────────────────────────────────────────────────────────────┐
│                    INGESTION / PERSISTENCE                       │
│  Relational schema, session files, reporting sinks               │
└────────────────────────────┬────────────────────────────────────┘
                             ↓
┌─────────────────────────────────────────────────────────────────┐
│              SERVICE LAYER (This Crate)                          │
│  • UnitStore       - fetch a unit's spike arrays                 │
│  • TrialStore      - fetch a session's trial table               │
│  • ConditionStore  - resolve the closed stimulation lookup       │
│  • ResultStore     - persist/reload analysis records             │
│  • BatchRunner     - rayon fan-out over unit×condition tasks     │
└────────────────────────────┬────────────────────────────────────┘
                             ↓
┌─────────────────────────────────────────────────────────────────┐
│                   ENGINE LAYER                                   │
│  spikealign-engine, spikealign-structures                        │
└─────────────────────────────────────────────────────────────────┘
```

## Design Principles

1. **Storage-Agnostic**: the engine never learns where data lives
2. **Synchronous Contracts**: collaborator calls block; parallelism lives in
   the batch runner's worker pool, one task per unit×condition key
3. **Soft vs Hard**: data shortfalls skip a single task; upstream misses and
   unknown conditions fail that task and surface to the caller
4. **Per-Task Randomness**: every task derives its own seeded generator from
   the batch seed and the unit key; no shared generator anywhere
*/

pub mod batch;
pub mod error;
pub mod memory;
pub mod traits;

pub use batch::{params_from_config, task_seed, BatchFailure, BatchRunner, BatchSummary};
pub use error::{ServiceError, ServiceResult};
pub use memory::MemoryStore;
pub use traits::{ConditionStore, ResultStore, TrialStore, UnitStore};
