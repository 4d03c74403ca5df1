//! Pipeline stages for cover-letter generation.
//!
//! Each submodule implements one step. Only [`llm`] and [`structured`]
//! touch the network; everything else is deterministic and tested offline.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ prompt ──▶ llm | structured ──▶ payload ──▶ layout ──▶ render
//! (JD +      (template)  (one API call)      (validate)  (wrap,      (PDF,
//!  materials)                                             paginate)   .txt)
//! ```
//!
//! 1. [`input`]      resolve the job description, load reference materials
//! 2. [`llm`]        plain completion through an edgequake-llm provider
//! 3. [`structured`] schema-constrained completion, refusal-aware
//! 4. [`payload`]    strip fences, parse JSON, enforce filename/letter rules
//! 5. [`layout`]     split paragraphs, wrap to the page width, paginate
//! 6. [`render`]     serialise to PDF and write files atomically

pub mod input;
pub mod layout;
pub mod llm;
pub mod payload;
pub mod render;
pub mod structured;
