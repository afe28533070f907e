// Gift recommendation pipeline.
// Input normalizer → {heuristic scorer | prompt builder → LLM → extractor} → assembler.
// All LLM calls go through llm_client; no direct API calls here.

pub mod assemble;
pub mod extract;
pub mod handlers;
pub mod normalize;
pub mod prompts;
pub mod recommender;
pub mod scoring;
pub mod share;
