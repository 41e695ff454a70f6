//! Reading and writing tensors in the IDX container used by the MNIST files.
//!
//! Header layout: `0x00 0x00 <type> <rank>`, then `rank` big-endian `u32`
//! extents, then the row-major payload. Type `0x08` is unsigned bytes and
//! `0x0D` big-endian `f32`. Paths ending in `.gz` are (de)compressed on the fly.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::{debug, info};

use crate::batch::Batch;
use crate::config::NetworkConfig;
use crate::error::{self, Result};
use crate::model::Model;
use crate::tensor::Tensor;

const TYPE_U8: u8 = 0x08;
const TYPE_F32: u8 = 0x0D;

/// Decoded IDX payload before conversion to `f32`.
#[derive(Debug, Clone)]
pub enum IdxArray {
    Bytes { shape: Vec<usize>, data: Vec<u8> },
    Floats(Tensor),
}

impl IdxArray {

    pub fn shape(&self) -> &[usize] {
        match self {
            IdxArray::Bytes { shape, .. } => shape,
            IdxArray::Floats(tensor) => tensor.shape(),
        }
    }

    /// Bytes are scaled to `[0, 1]` when `normalize` is set.
    pub fn into_tensor(self, normalize: bool) -> Tensor {
        match self {
            IdxArray::Bytes { shape, data } => {
                let scale = if normalize { 255.0 } else { 1.0 };
                let data = data.iter().map(|&b| b as f32 / scale).collect();
                Tensor::new(data, shape)
            }
            IdxArray::Floats(tensor) => tensor,
        }
    }

}

fn open_reader(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path)
        .map_err(|e| error::load(path, format!("failed to open: {}", e)))?;
    let reader: Box<dyn Read> = if is_gz(path) {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

// Concrete writer so the gzip trailer is written and its errors surface.
enum IdxWriter {
    Plain(BufWriter<File>),
    Gz(GzEncoder<BufWriter<File>>),
}

impl IdxWriter {

    fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .map_err(|e| error::load(path, format!("failed to create: {}", e)))?;
        let file = BufWriter::new(file);
        Ok(if is_gz(path) {
            IdxWriter::Gz(GzEncoder::new(file, Compression::default()))
        } else {
            IdxWriter::Plain(file)
        })
    }

    fn finish(self) -> std::io::Result<()> {
        let file = match self {
            IdxWriter::Plain(file) => file,
            IdxWriter::Gz(encoder) => encoder.finish()?,
        };
        file.into_inner().map_err(|e| e.into_error())?;
        Ok(())
    }

}

impl Write for IdxWriter {

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            IdxWriter::Plain(file) => file.write(buf),
            IdxWriter::Gz(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            IdxWriter::Plain(file) => file.flush(),
            IdxWriter::Gz(encoder) => encoder.flush(),
        }
    }

}

fn is_gz(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "gz")
}

pub fn read_idx_array(path: impl AsRef<Path>) -> Result<IdxArray> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)
        .map_err(|e| error::load(path, format!("failed to read magic number: {}", e)))?;
    if magic[0] != 0 || magic[1] != 0 {
        return Err(error::load(path, format!("invalid magic number {:02x?}", magic)));
    }
    let (type_code, rank) = (magic[2], magic[3] as usize);
    if rank == 0 {
        return Err(error::load(path, "rank 0 arrays are not supported"));
    }

    let mut shape = Vec::with_capacity(rank);
    for axis in 0..rank {
        let mut extent = [0u8; 4];
        reader.read_exact(&mut extent)
            .map_err(|e| error::load(path, format!("failed to read extent {}: {}", axis, e)))?;
        shape.push(u32::from_be_bytes(extent) as usize);
    }
    let size = shape.iter().try_fold(1usize, |acc, &extent| acc.checked_mul(extent))
        .ok_or_else(|| error::load(path, format!("extents {:?} overflow the address space", shape)))?;

    let array = match type_code {
        TYPE_U8 => {
            let data = read_payload(&mut reader, path, size)?;
            IdxArray::Bytes { shape, data }
        }
        TYPE_F32 => {
            let len = size.checked_mul(4)
                .ok_or_else(|| error::load(path, format!("{} floats overflow the address space", size)))?;
            let raw = read_payload(&mut reader, path, len)?;
            let data = raw.chunks_exact(4)
                .map(|b| f32::from_be_bytes([b[0], b[1], b[2], b[3]]))
                .collect();
            IdxArray::Floats(Tensor::new(data, shape))
        }
        other => {
            return Err(error::load(path, format!("unsupported IDX element type 0x{:02x}", other)));
        }
    };

    debug!(path = %path.display(), shape = ?array.shape(), "read idx array");
    Ok(array)
}

// Buffers only the bytes actually present, never the length the header claims.
fn read_payload(reader: &mut dyn Read, path: &Path, len: usize) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    reader.take(len as u64).read_to_end(&mut data)
        .map_err(|e| error::load(path, format!("failed to read payload: {}", e)))?;
    if data.len() < len {
        return Err(error::load(path, format!(
            "payload holds {} of {} expected bytes", data.len(), len)));
    }
    Ok(data)
}

/// Reads any IDX file as `f32`, scaling byte payloads to `[0, 1]`.
pub fn read_idx(path: impl AsRef<Path>) -> Result<Tensor> {
    Ok(read_idx_array(path)?.into_tensor(true))
}

fn encode_header(type_code: u8, shape: &[usize]) -> Result<Vec<u8>> {
    let rank = u8::try_from(shape.len())
        .map_err(|_| error::shape("idx", format!("rank {} doesn't fit the header", shape.len())))?;
    let mut header = vec![0, 0, type_code, rank];
    for &extent in shape {
        let extent = u32::try_from(extent)
            .map_err(|_| error::shape("idx", format!("extent {} doesn't fit the header", extent)))?;
        header.extend_from_slice(&extent.to_be_bytes());
    }
    Ok(header)
}

pub fn write_idx_f32(path: impl AsRef<Path>, tensor: &Tensor) -> Result<()> {
    let path = path.as_ref();
    let header = encode_header(TYPE_F32, tensor.shape())?;
    let mut writer = IdxWriter::create(path)?;
    writer.write_all(&header)?;
    for value in &tensor.data {
        writer.write_all(&value.to_be_bytes())?;
    }
    writer.finish()?;
    Ok(())
}

pub fn write_idx_u8(path: impl AsRef<Path>, shape: &[usize], data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let size = shape.iter().try_fold(1usize, |acc, &extent| acc.checked_mul(extent));
    if size != Some(data.len()) {
        return Err(error::shape("idx", format!(
            "{} bytes don't fill shape {:?}", data.len(), shape)));
    }
    let header = encode_header(TYPE_U8, shape)?;
    let mut writer = IdxWriter::create(path)?;
    writer.write_all(&header)?;
    writer.write_all(data)?;
    writer.finish()?;
    Ok(())
}

/// Loads images and labels into a [`Batch`].
///
/// Rank-3 images `(N, H, W)` gain a unit channel axis. Rank-1 byte labels are
/// class indices and become one-hot rows; rank-2 labels are used as scores.
/// `limit` keeps only the first samples.
pub fn load_batch(
    images_path: impl AsRef<Path>,
    labels_path: impl AsRef<Path>,
    limit: Option<usize>,
    num_classes: usize,
) -> Result<Batch> {
    let images_path = images_path.as_ref();
    let labels_path = labels_path.as_ref();
    info!("Attempting to load images from: {}", images_path.display());
    info!("Attempting to load labels from: {}", labels_path.display());

    let images = read_idx(images_path)?;
    let xdims = images.shape().to_vec();
    let images = match xdims.as_slice() {
        &[n, h, w] => images.reshape(vec![n, h, w, 1])?,
        [_, _, _, _] => images,
        _ => return Err(error::load(images_path, format!(
            "expected (N,H,W) or (N,H,W,C) images, got {:?}", xdims))),
    };

    let labels = match read_idx_array(labels_path)? {
        IdxArray::Bytes { shape, data } if shape.len() == 1 => {
            Batch::one_hot(&data, num_classes).map_err(|e| error::load(labels_path, e.to_string()))?
        }
        array if array.shape().len() == 2 => array.into_tensor(false),
        array => return Err(error::load(labels_path, format!(
            "expected class bytes (N) or scores (N,K), got {:?}", array.shape()))),
    };

    if images.rows() != labels.rows() {
        return Err(error::load(images_path, format!(
            "Number of images ({}) and labels ({}) don't match", images.rows(), labels.rows())));
    }

    let (images, labels) = match limit {
        Some(limit) if limit < images.rows() => (truncate(images, limit), truncate(labels, limit)),
        _ => (images, labels),
    };

    info!(xdims = ?images.shape(), ydims = ?labels.shape(), "loaded batch");
    Batch::new(images, labels)
}

// Keep the first `rows` entries along the leading axis.
fn truncate(mut tensor: Tensor, rows: usize) -> Tensor {
    let row_len: usize = tensor.shape[1..].iter().product();
    tensor.data.truncate(rows * row_len);
    tensor.shape[0] = rows;
    tensor
}

/// Path of layer `name` inside `dir`, preferring the uncompressed file.
pub fn layer_path(dir: &Path, name: &str) -> PathBuf {
    let plain = dir.join(format!("{}.idx", name));
    if plain.exists() {
        return plain;
    }
    let gz = dir.join(format!("{}.idx.gz", name));
    if gz.exists() { gz } else { plain }
}

/// Loads `conv1`, `conv2`, `fc1` and `fc2` from `dir`.
pub fn load_model(dir: impl AsRef<Path>, config: &NetworkConfig) -> Result<Model> {
    let dir = dir.as_ref();
    let read = |name: &str| -> Result<Tensor> {
        let path = layer_path(dir, name);
        match read_idx_array(&path)? {
            IdxArray::Floats(tensor) => Ok(tensor),
            IdxArray::Bytes { .. } => Err(error::load(&path, "weights must be stored as f32")),
        }
    };

    let model = Model::new(read("conv1")?, read("conv2")?, read("fc1")?, read("fc2")?, config)
        .map_err(|e| error::load(dir, e.to_string()))?;
    for (name, weight) in model.layers() {
        info!(layer = name, shape = ?weight.shape(), "loaded weights");
    }
    Ok(model)
}

/// Writes each layer of `model` as `<dir>/<layer>.idx`.
pub fn save_model(dir: impl AsRef<Path>, model: &Model) -> Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    for (name, weight) in model.layers() {
        write_idx_f32(dir.join(format!("{}.idx", name)), weight)?;
    }
    Ok(())
}
