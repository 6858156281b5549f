// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod browser_driver;
pub mod browser_pool;
pub mod factory;
pub mod static_driver;
pub mod traits;
