pub mod intersection_registry;
