//! Background tasks for the rendering system.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: computes face visibility and the mesh of one
//!   chunk from a snapshot of its neighbourhood

pub mod chunk_mesh_generation_task;
