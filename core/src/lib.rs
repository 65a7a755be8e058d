pub mod clock;
pub mod command;
pub mod company;
pub mod config;
pub mod employment;
pub mod engine;
pub mod error;
pub mod event;
pub mod geography;
pub mod government;
pub mod history;
pub mod market;
pub mod name_generator;
pub mod population;
pub mod region;
pub mod report;
pub mod rng;
pub mod scheduler;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod subsystem;
pub mod types;
pub mod world;
