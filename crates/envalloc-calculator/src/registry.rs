use crate::built_in::{
    direct_input::DirectInputStrategy, equipment_info::EquipmentInfoStrategy,
    production_volume::ProductionVolumeStrategy,
};
use crate::strategy::RatioStrategy;
use envalloc_types::AllocationMethod;
use std::collections::HashMap;

pub struct StrategyRegistry {
    strategies: HashMap<AllocationMethod, Box<dyn RatioStrategy>>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_built_ins()
    }
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self { strategies: HashMap::new() }
    }

    /// Registry with one strategy per [`AllocationMethod`].
    pub fn with_built_ins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(EquipmentInfoStrategy));
        registry.register(Box::new(ProductionVolumeStrategy));
        registry.register(Box::new(DirectInputStrategy));
        registry
    }

    /// Registers a strategy, replacing any previous one for the same method.
    pub fn register(&mut self, strategy: Box<dyn RatioStrategy>) {
        self.strategies.insert(strategy.method(), strategy);
    }

    pub fn get(&self, method: AllocationMethod) -> Option<&dyn RatioStrategy> {
        self.strategies.get(&method).map(|s| s.as_ref())
    }
}
