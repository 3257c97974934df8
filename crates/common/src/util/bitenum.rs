// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::ops::{BitOr, BitOrAssign};

/// A barebones minimal custom bitset enum, serialized as its raw u16 so flag
/// sets round-trip through the document store compactly.
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct BitEnum<T: ToPrimitive> {
    value: u16,
    #[serde(skip)]
    phantom: PhantomData<T>,
}

impl<T: ToPrimitive> Default for BitEnum<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ToPrimitive> BitEnum<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: 0,
            phantom: PhantomData,
        }
    }

    #[must_use]
    pub fn to_u16(&self) -> u16 {
        self.value
    }

    #[must_use]
    pub fn from_u16(value: u16) -> Self {
        Self {
            value,
            phantom: PhantomData,
        }
    }

    pub fn new_with(value: T) -> Self {
        let mut s = Self::new();
        s.set(value);
        s
    }

    #[must_use]
    pub fn all() -> Self {
        Self {
            value: u16::MAX,
            phantom: PhantomData,
        }
    }

    pub fn set(&mut self, value: T) {
        self.value |= 1 << value.to_u64().unwrap();
    }

    pub fn clear(&mut self, value: T) {
        self.value &= !(1 << value.to_u64().unwrap());
    }

    pub fn contains(&self, value: T) -> bool {
        self.value & (1 << value.to_u64().unwrap()) != 0
    }

    pub fn contains_all(&self, values: BitEnum<T>) -> bool {
        values.value & self.value == values.value
    }

    pub fn is_empty(&self) -> bool {
        self.value == 0
    }
}

impl<T: ToPrimitive> BitOr for BitEnum<T> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self {
            value: self.value | rhs.value,
            phantom: PhantomData,
        }
    }
}

impl<T: ToPrimitive> BitOrAssign<T> for BitEnum<T> {
    fn bitor_assign(&mut self, rhs: T) {
        self.set(rhs);
    }
}

impl<T: ToPrimitive> BitOr<T> for BitEnum<T> {
    type Output = Self;

    fn bitor(self, rhs: T) -> Self::Output {
        let mut s = self;
        s.set(rhs);
        s
    }
}

impl<T: ToPrimitive> From<T> for BitEnum<T> {
    fn from(value: T) -> Self {
        Self::new_with(value)
    }
}

impl<T: ToPrimitive> FromIterator<T> for BitEnum<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut s = Self::new();
        for v in iter {
            s.set(v);
        }
        s
    }
}
