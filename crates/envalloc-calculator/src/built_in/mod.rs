//! Built-in calculators provided by the envalloc engine.

// Ratio derivation strategies
pub mod direct_input;
pub mod equipment_info;
pub mod production_volume;

// Allocation calculators
pub mod proportional_allocator;
