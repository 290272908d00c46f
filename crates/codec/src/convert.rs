//! Shape, content, and whole-array conversions.
//!
//! Packed content is little-endian. Fixed-width types occupy exactly
//! `num_elements * size_of(dtype)` bytes; strings are a u64-LE
//! length-prefixed concatenation of UTF-8 bytes; complex elements are the
//! real component followed by the imaginary component.

use byteorder::{ByteOrder, LittleEndian};
use half::f16;

use manifold_core::{
    Array, ArrayContent, ArrayShape, DType, Error, PartialShape, Result, Shape, Tensor, TensorData,
};

/// Convert a wire shape into a fully defined [`Shape`].
///
/// Fails with `InvalidArgument` if the shape is of unknown rank or any
/// dimension is negative (unknown) in this context.
pub fn shape_from_wire(shape: &ArrayShape) -> Result<Shape> {
    if shape.unknown_rank {
        return Err(Error::invalid_argument(
            "expected a fully defined shape, found unknown rank",
        ));
    }
    let dims = shape
        .dims
        .iter()
        .map(|&d| {
            if d < 0 {
                Err(Error::invalid_argument(format!(
                    "expected a fully defined shape, found unknown dimension {}",
                    d
                )))
            } else {
                Ok(d as u64)
            }
        })
        .collect::<Result<Vec<u64>>>()?;
    Ok(Shape::new(dims))
}

/// Convert a wire shape into a [`PartialShape`]. Never fails: negative
/// dimensions become unknown axes and the unknown-rank flag becomes
/// [`PartialShape::Unranked`].
pub fn partial_shape_from_wire(shape: &ArrayShape) -> PartialShape {
    if shape.unknown_rank {
        return PartialShape::Unranked;
    }
    PartialShape::Ranked(
        shape
            .dims
            .iter()
            .map(|&d| if d < 0 { None } else { Some(d as u64) })
            .collect(),
    )
}

/// Convert a wire array into a native tensor.
///
/// Dispatches on the dtype tag and accepts either content encoding.
/// Fails with `InvalidArgument` on a partial/unknown shape, an
/// element-count or byte-length mismatch, or an element list whose dtype
/// tag disagrees with the array's.
pub fn tensor_from_array(array: &Array) -> Result<Tensor> {
    let shape = shape_from_wire(&array.shape)?;
    match &array.content {
        ArrayContent::Bytes(bytes) => tensor_from_array_content(array.dtype, &shape, bytes),
        ArrayContent::Elements(data) => {
            if data.dtype() != array.dtype {
                return Err(Error::invalid_argument(format!(
                    "element list of dtype {} does not match declared dtype {}",
                    data.dtype(),
                    array.dtype
                )));
            }
            Tensor::new(shape, data.clone())
        }
    }
}

/// Convert a native tensor into a wire array.
///
/// Always produces the packed-byte content form.
pub fn array_from_tensor(tensor: &Tensor) -> Result<Array> {
    Ok(Array {
        dtype: tensor.dtype(),
        shape: ArrayShape::try_from(tensor.shape())?,
        content: ArrayContent::Bytes(pack_data(tensor.data())),
    })
}

/// Pack a tensor's content into its byte representation, dtype and shape
/// established by the surrounding context.
pub fn array_content_from_tensor(tensor: &Tensor) -> Result<Vec<u8>> {
    Ok(pack_data(tensor.data()))
}

/// Decode content bytes into a tensor for a known dtype and shape.
pub fn tensor_from_array_content(dtype: DType, shape: &Shape, content: &[u8]) -> Result<Tensor> {
    let count = shape
        .num_elements()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            Error::invalid_argument(format!(
                "shape {} implies more elements than can be addressed",
                shape
            ))
        })?;
    let data = unpack_data(dtype, count, content)?;
    Tensor::new(shape.clone(), data)
}

// ---------------------------------------------------------------------------
// Packing

macro_rules! pack_fixed {
    ($values:expr, $width:expr, $write:path) => {{
        let mut buf = Vec::with_capacity($values.len() * $width);
        for value in $values {
            let mut chunk = [0u8; $width];
            $write(&mut chunk, *value);
            buf.extend_from_slice(&chunk);
        }
        buf
    }};
}

fn pack_data(data: &TensorData) -> Vec<u8> {
    match data {
        TensorData::Bool(values) => values.iter().map(|&b| b as u8).collect(),
        TensorData::Int8(values) => values.iter().map(|&v| v as u8).collect(),
        TensorData::Uint8(values) => values.clone(),
        TensorData::Int16(values) => pack_fixed!(values, 2, LittleEndian::write_i16),
        TensorData::Uint16(values) => pack_fixed!(values, 2, LittleEndian::write_u16),
        TensorData::Int32(values) => pack_fixed!(values, 4, LittleEndian::write_i32),
        TensorData::Uint32(values) => pack_fixed!(values, 4, LittleEndian::write_u32),
        TensorData::Int64(values) => pack_fixed!(values, 8, LittleEndian::write_i64),
        TensorData::Uint64(values) => pack_fixed!(values, 8, LittleEndian::write_u64),
        TensorData::Float16(values) => {
            let mut buf = Vec::with_capacity(values.len() * 2);
            for value in values {
                let mut chunk = [0u8; 2];
                LittleEndian::write_u16(&mut chunk, value.to_bits());
                buf.extend_from_slice(&chunk);
            }
            buf
        }
        TensorData::Float32(values) => pack_fixed!(values, 4, LittleEndian::write_f32),
        TensorData::Float64(values) => pack_fixed!(values, 8, LittleEndian::write_f64),
        TensorData::Complex64(values) => {
            let mut buf = Vec::with_capacity(values.len() * 8);
            for (re, im) in values {
                let mut chunk = [0u8; 8];
                LittleEndian::write_f32(&mut chunk[..4], *re);
                LittleEndian::write_f32(&mut chunk[4..], *im);
                buf.extend_from_slice(&chunk);
            }
            buf
        }
        TensorData::Complex128(values) => {
            let mut buf = Vec::with_capacity(values.len() * 16);
            for (re, im) in values {
                let mut chunk = [0u8; 16];
                LittleEndian::write_f64(&mut chunk[..8], *re);
                LittleEndian::write_f64(&mut chunk[8..], *im);
                buf.extend_from_slice(&chunk);
            }
            buf
        }
        TensorData::String(values) => {
            let mut buf = Vec::new();
            for value in values {
                let mut len = [0u8; 8];
                LittleEndian::write_u64(&mut len, value.len() as u64);
                buf.extend_from_slice(&len);
                buf.extend_from_slice(value.as_bytes());
            }
            buf
        }
    }
}

// ---------------------------------------------------------------------------
// Unpacking

macro_rules! unpack_fixed {
    ($bytes:expr, $width:expr, $read:path) => {
        $bytes.chunks_exact($width).map(|c| $read(c)).collect()
    };
}

fn check_fixed_len(dtype: DType, expected: usize, width: usize, bytes: &[u8]) -> Result<()> {
    let implied = expected.checked_mul(width).ok_or_else(|| {
        Error::invalid_argument(format!(
            "{} elements of dtype {} imply more bytes than can be addressed",
            expected, dtype
        ))
    })?;
    if bytes.len() != implied {
        return Err(Error::invalid_argument(format!(
            "content of {} bytes does not match the {} bytes implied by {} elements of dtype {}",
            bytes.len(),
            implied,
            expected,
            dtype
        )));
    }
    Ok(())
}

fn unpack_data(dtype: DType, expected: usize, bytes: &[u8]) -> Result<TensorData> {
    if let Some(width) = dtype.size_of() {
        check_fixed_len(dtype, expected, width, bytes)?;
    }
    let data = match dtype {
        DType::Bool => TensorData::Bool(bytes.iter().map(|&b| b != 0).collect()),
        DType::Int8 => TensorData::Int8(bytes.iter().map(|&b| b as i8).collect()),
        DType::Uint8 => TensorData::Uint8(bytes.to_vec()),
        DType::Int16 => TensorData::Int16(unpack_fixed!(bytes, 2, LittleEndian::read_i16)),
        DType::Uint16 => TensorData::Uint16(unpack_fixed!(bytes, 2, LittleEndian::read_u16)),
        DType::Int32 => TensorData::Int32(unpack_fixed!(bytes, 4, LittleEndian::read_i32)),
        DType::Uint32 => TensorData::Uint32(unpack_fixed!(bytes, 4, LittleEndian::read_u32)),
        DType::Int64 => TensorData::Int64(unpack_fixed!(bytes, 8, LittleEndian::read_i64)),
        DType::Uint64 => TensorData::Uint64(unpack_fixed!(bytes, 8, LittleEndian::read_u64)),
        DType::Float16 => TensorData::Float16(
            bytes
                .chunks_exact(2)
                .map(|c| f16::from_bits(LittleEndian::read_u16(c)))
                .collect(),
        ),
        DType::Float32 => TensorData::Float32(unpack_fixed!(bytes, 4, LittleEndian::read_f32)),
        DType::Float64 => TensorData::Float64(unpack_fixed!(bytes, 8, LittleEndian::read_f64)),
        DType::Complex64 => TensorData::Complex64(
            bytes
                .chunks_exact(8)
                .map(|c| (LittleEndian::read_f32(&c[..4]), LittleEndian::read_f32(&c[4..])))
                .collect(),
        ),
        DType::Complex128 => TensorData::Complex128(
            bytes
                .chunks_exact(16)
                .map(|c| (LittleEndian::read_f64(&c[..8]), LittleEndian::read_f64(&c[8..])))
                .collect(),
        ),
        DType::String => TensorData::String(unpack_strings(expected, bytes)?),
    };
    Ok(data)
}

fn unpack_strings(expected: usize, bytes: &[u8]) -> Result<Vec<String>> {
    // Each string costs at least its 8-byte length prefix, so the content
    // bounds how many elements can actually be present.
    let mut values = Vec::with_capacity(expected.min(bytes.len() / 8));
    let mut rest = bytes;
    for _ in 0..expected {
        if rest.len() < 8 {
            return Err(Error::invalid_argument(
                "string content truncated before length prefix",
            ));
        }
        let len = LittleEndian::read_u64(&rest[..8]) as usize;
        rest = &rest[8..];
        if rest.len() < len {
            return Err(Error::invalid_argument(format!(
                "string content truncated: expected {} bytes, found {}",
                len,
                rest.len()
            )));
        }
        let value = std::str::from_utf8(&rest[..len])
            .map_err(|_| Error::invalid_argument("string content is not valid UTF-8"))?;
        values.push(value.to_string());
        rest = &rest[len..];
    }
    if !rest.is_empty() {
        return Err(Error::invalid_argument(format!(
            "{} trailing bytes after {} string elements",
            rest.len(),
            expected
        )));
    }
    Ok(values)
}
