//! Property tests: every supported dtype round-trips byte-for-byte
//! through the packed-content wire form.

use half::f16;
use proptest::prelude::*;

use manifold_codec::{array_from_tensor, tensor_from_array};
use manifold_core::{Shape, Tensor, TensorData};

fn assert_roundtrip(tensor: &Tensor) {
    let array = array_from_tensor(tensor).unwrap();
    let back = tensor_from_array(&array).unwrap();
    assert_eq!(&back, tensor);
}

/// A rank-1 shape holding exactly `len` elements.
fn shape_for(len: usize) -> Shape {
    Shape::new(vec![len as u64])
}

proptest! {
    #[test]
    fn int32_tensors_roundtrip(values in proptest::collection::vec(any::<i32>(), 0..64)) {
        let tensor = Tensor::new(shape_for(values.len()), TensorData::Int32(values)).unwrap();
        assert_roundtrip(&tensor);
    }

    #[test]
    fn int64_tensors_roundtrip(values in proptest::collection::vec(any::<i64>(), 0..64)) {
        let tensor = Tensor::new(shape_for(values.len()), TensorData::Int64(values)).unwrap();
        assert_roundtrip(&tensor);
    }

    #[test]
    fn uint8_tensors_roundtrip(values in proptest::collection::vec(any::<u8>(), 0..64)) {
        let tensor = Tensor::new(shape_for(values.len()), TensorData::Uint8(values)).unwrap();
        assert_roundtrip(&tensor);
    }

    #[test]
    fn uint64_tensors_roundtrip(values in proptest::collection::vec(any::<u64>(), 0..64)) {
        let tensor = Tensor::new(shape_for(values.len()), TensorData::Uint64(values)).unwrap();
        assert_roundtrip(&tensor);
    }

    #[test]
    fn bool_tensors_roundtrip(values in proptest::collection::vec(any::<bool>(), 0..64)) {
        let tensor = Tensor::new(shape_for(values.len()), TensorData::Bool(values)).unwrap();
        assert_roundtrip(&tensor);
    }

    #[test]
    fn float32_bits_roundtrip(bits in proptest::collection::vec(any::<u32>(), 0..64)) {
        // Compare bit patterns so NaN payloads count as preserved.
        let values: Vec<f32> = bits.iter().map(|&b| f32::from_bits(b)).collect();
        let tensor = Tensor::new(shape_for(values.len()), TensorData::Float32(values)).unwrap();
        let array = array_from_tensor(&tensor).unwrap();
        let back = tensor_from_array(&array).unwrap();
        match back.data() {
            TensorData::Float32(decoded) => {
                let decoded_bits: Vec<u32> = decoded.iter().map(|v| v.to_bits()).collect();
                prop_assert_eq!(decoded_bits, bits);
            }
            other => prop_assert!(false, "expected float32 data, got {:?}", other.dtype()),
        }
    }

    #[test]
    fn float64_tensors_roundtrip(values in proptest::collection::vec(any::<f64>().prop_filter("finite", |v| v.is_finite()), 0..64)) {
        let tensor = Tensor::new(shape_for(values.len()), TensorData::Float64(values)).unwrap();
        assert_roundtrip(&tensor);
    }

    #[test]
    fn float16_bits_roundtrip(bits in proptest::collection::vec(any::<u16>(), 0..64)) {
        let values: Vec<f16> = bits.iter().map(|&b| f16::from_bits(b)).collect();
        let tensor = Tensor::new(shape_for(values.len()), TensorData::Float16(values)).unwrap();
        let array = array_from_tensor(&tensor).unwrap();
        let back = tensor_from_array(&array).unwrap();
        match back.data() {
            TensorData::Float16(decoded) => {
                let decoded_bits: Vec<u16> = decoded.iter().map(|v| v.to_bits()).collect();
                prop_assert_eq!(decoded_bits, bits);
            }
            other => prop_assert!(false, "expected float16 data, got {:?}", other.dtype()),
        }
    }

    #[test]
    fn complex64_tensors_roundtrip(values in proptest::collection::vec((any::<f32>().prop_filter("finite", |v| v.is_finite()), any::<f32>().prop_filter("finite", |v| v.is_finite())), 0..32)) {
        let tensor = Tensor::new(shape_for(values.len()), TensorData::Complex64(values)).unwrap();
        assert_roundtrip(&tensor);
    }

    #[test]
    fn complex128_tensors_roundtrip(values in proptest::collection::vec((any::<f64>().prop_filter("finite", |v| v.is_finite()), any::<f64>().prop_filter("finite", |v| v.is_finite())), 0..32)) {
        let tensor = Tensor::new(shape_for(values.len()), TensorData::Complex128(values)).unwrap();
        assert_roundtrip(&tensor);
    }

    #[test]
    fn string_tensors_roundtrip(values in proptest::collection::vec(".{0,16}", 0..16)) {
        let tensor = Tensor::new(shape_for(values.len()), TensorData::String(values)).unwrap();
        assert_roundtrip(&tensor);
    }
}
