#![doc = include_str!("../../README.md")]

pub mod arm_config;
pub mod arm_controller;
pub mod clutch;
pub mod gripper;
pub mod ik;
pub mod joints;
pub mod pose_tracker;
pub mod safety_gate;
pub mod sample;
pub mod solution_selector;
pub mod target_pose;
pub mod teleop_system;
