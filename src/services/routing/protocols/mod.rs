// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod concentrated;
pub mod constant_product;
pub mod singleton;
pub mod stable_volatile;

pub use concentrated::ConcentratedCodec;
pub use constant_product::ConstantProductCodec;
pub use singleton::SingletonCodec;
pub use stable_volatile::StableVolatileCodec;
