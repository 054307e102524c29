/*
 *  Copyright (C) 2025  Markus Elias Gerber
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use core::mem::size_of;

/// A fixed-size value that can be stored inside of a page.
///
/// Values are copied into and out of the page buffer, so there are no
/// alignment requirements. All provided implementations use little-endian
/// byte order.
pub trait PageValue: Sized {
    /// Number of bytes this value occupies inside of a page
    const SIZE: usize;

    /// Writes this value to `dest`, which is exactly `Self::SIZE` bytes long
    fn encode(&self, dest: &mut [u8]);

    /// Reads a value from `src`, which is exactly `Self::SIZE` bytes long
    fn decode(src: &[u8]) -> Self;
}

macro_rules! impl_page_value_for_numbers {
    ($($ty:ty),*) => {
        $(
            impl PageValue for $ty {
                const SIZE: usize = size_of::<$ty>();

                #[inline]
                fn encode(&self, dest: &mut [u8]) {
                    dest[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn decode(src: &[u8]) -> Self {
                    let mut bytes = [0u8; size_of::<$ty>()];
                    bytes.copy_from_slice(&src[..Self::SIZE]);
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_page_value_for_numbers!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

impl PageValue for bool {
    const SIZE: usize = 1;

    fn encode(&self, dest: &mut [u8]) {
        dest[0] = *self as u8;
    }

    fn decode(src: &[u8]) -> Self {
        src[0] != 0
    }
}

impl<T: PageValue, const N: usize> PageValue for [T; N] {
    const SIZE: usize = T::SIZE * N;

    fn encode(&self, dest: &mut [u8]) {
        for (item, chunk) in self.iter().zip(dest.chunks_exact_mut(T::SIZE.max(1))) {
            item.encode(chunk);
        }
    }

    fn decode(src: &[u8]) -> Self {
        core::array::from_fn(|i| T::decode(&src[i * T::SIZE..(i + 1) * T::SIZE]))
    }
}

#[cfg(test)]
mod test {
    use super::PageValue;

    fn encoded<T: PageValue>(value: &T) -> Vec<u8> {
        let mut buffer = vec![0u8; T::SIZE];
        value.encode(&mut buffer);
        buffer
    }

    #[test]
    fn test_numbers_are_little_endian() {
        assert_eq!(encoded(&0x1234_5678u32), vec![0x78, 0x56, 0x34, 0x12]);
        assert_eq!(i16::decode(&[0xff, 0xff]), -1);
        assert_eq!(f64::decode(&encoded(&1.5f64)), 1.5);
        assert!(bool::decode(&encoded(&true)));
    }

    #[test]
    fn test_array_layout() {
        let value: [u16; 3] = [1, 2, 0x0300];
        assert_eq!(<[u16; 3]>::SIZE, 6);
        assert_eq!(encoded(&value), vec![1, 0, 2, 0, 0, 3]);
        assert_eq!(<[u16; 3]>::decode(&encoded(&value)), value);

        let nested: [[u8; 2]; 2] = [[1, 2], [3, 4]];
        assert_eq!(encoded(&nested), vec![1, 2, 3, 4]);
    }
}
