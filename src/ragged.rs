//! Decoding of ragged lists: a sequence of variable length binary records,
//! each prefixed by its own element count.
//!
//! The length of a record is only known after reading its count, so a single
//! forward pass over the buffer collects the byte offset of every record
//! boundary. Consecutive records with the same byte length are then grouped
//! into runs, and each run is a fixed-stride block that can be decoded with
//! `chunks_exact` instead of interpreting every row individually.
//!
//! Records may be surrounded by fixed width fields (`prefix` / `suffix` bytes
//! in [`RaggedLayout`]), which is how a face element with scalar properties on
//! either side of its vertex list is laid out.
//!
//! [`RaggedList`] and [`RaggedBlock`] only borrow the input buffer;
//! [`RaggedBlock::to_cell_block`] and [`RaggedBlock::scalar_column`] copy the
//! values out into owned arrays.

use crate::prelude::*;
use byteorder::ByteOrder;

/// Byte layout of a single ragged record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaggedLayout {
    /// bytes of fixed width fields before the count
    pub prefix: usize,
    /// integer type of the leading count
    pub count: Dtype,
    /// type of the list entries
    pub data: Dtype,
    /// bytes of fixed width fields after the list entries
    pub suffix: usize,
    pub endian: Endianness,
}

impl RaggedLayout {
    pub fn new(count: Dtype, data: Dtype, endian: Endianness) -> Self {
        Self {
            prefix: 0,
            count,
            data,
            suffix: 0,
            endian,
        }
    }

    /// surround every record with `prefix` and `suffix` bytes of fixed width fields
    pub fn with_padding(mut self, prefix: usize, suffix: usize) -> Self {
        self.prefix = prefix;
        self.suffix = suffix;
        self
    }

    /// total bytes of a record holding `count` entries
    fn record_length(&self, count: usize) -> Option<usize> {
        count
            .checked_mul(self.data.size())?
            .checked_add(self.prefix + self.count.size() + self.suffix)
    }

    /// offset of the first list entry inside a record
    fn data_start(&self) -> usize {
        self.prefix + self.count.size()
    }
}

/// Where a fixed width field sits inside a ragged record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPosition {
    /// byte offset from the start of the record
    Prefix(usize),
    /// byte offset from the start of the suffix (the end of the list entries)
    Suffix(usize),
}

/// The record boundaries of a ragged list inside a borrowed buffer
#[derive(Debug)]
pub struct RaggedList<'a> {
    buffer: &'a [u8],
    layout: RaggedLayout,
    /// `num_records + 1` byte offsets. Record `i` is `offsets[i]..offsets[i + 1]`
    offsets: Vec<usize>,
    /// half open record index ranges of equal record length
    runs: Vec<(usize, usize)>,
}

impl<'a> RaggedList<'a> {
    /// walk `num_records` records from the start of `buffer`
    ///
    /// `layout.count` must be an integer dtype. Bytes after the last record
    /// are left untouched, see [`RaggedList::consumed`].
    pub fn scan(
        buffer: &'a [u8],
        layout: RaggedLayout,
        num_records: usize,
    ) -> Result<Self, BodyError> {
        let offsets = with_scalar_type!(layout.count, C => {
            with_byte_order!(layout.endian, B => {
                scan_offsets::<C, B>(buffer, &layout, num_records)?
            })
        });

        let runs = equal_length_runs(&offsets);

        Ok(Self {
            buffer,
            layout,
            offsets,
            runs,
        })
    }

    /// number of bytes taken up by the records
    pub fn consumed(&self) -> usize {
        // offsets always holds the starting offset
        self.offsets[self.offsets.len() - 1]
    }

    pub fn num_records(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn layout(&self) -> &RaggedLayout {
        &self.layout
    }

    /// the homogeneous blocks of the list, in file order
    pub fn blocks(&self) -> impl Iterator<Item = RaggedBlock<'a>> + '_ {
        let buffer: &'a [u8] = self.buffer;
        self.runs.iter().map(move |&(start, end)| {
            let start_byte = self.offsets[start];
            let end_byte = self.offsets[end];
            let record_length = (end_byte - start_byte) / (end - start);
            let width = (record_length - self.layout.prefix - self.layout.count.size()
                - self.layout.suffix)
                / self.layout.data.size();

            RaggedBlock {
                bytes: &buffer[start_byte..end_byte],
                record_length,
                width,
                layout: self.layout,
            }
        })
    }
}

fn scan_offsets<C: Scalar, B: ByteOrder>(
    buffer: &[u8],
    layout: &RaggedLayout,
    num_records: usize,
) -> Result<Vec<usize>, BodyError> {
    let count_size = C::DTYPE.size();
    // each record holds at least its count field
    let mut offsets = Vec::with_capacity(num_records.min(buffer.len() / count_size) + 1);
    let mut at = 0;
    offsets.push(at);

    for record in 0..num_records {
        let remaining = &buffer[at..];

        let count_bytes = remaining
            .get(layout.prefix..layout.prefix + count_size)
            .ok_or(BodyError::TruncatedRecord {
                record,
                expected: layout.prefix + count_size,
                found: remaining.len(),
            })?;

        let raw = C::read::<B>(count_bytes);
        let length = num_traits::cast::<C, usize>(raw)
            .and_then(|count| layout.record_length(count))
            .ok_or_else(|| BodyError::InvalidListCount(raw.to_string()))?;

        if length > remaining.len() {
            return Err(BodyError::TruncatedRecord {
                record,
                expected: length,
                found: remaining.len(),
            });
        }

        at += length;
        offsets.push(at);
    }

    Ok(offsets)
}

/// group record indices into maximal runs of equal byte length
fn equal_length_runs(offsets: &[usize]) -> Vec<(usize, usize)> {
    let lengths: Vec<usize> = offsets.windows(2).map(|w| w[1] - w[0]).collect();

    let mut runs = Vec::new();
    let mut start = 0;
    for idx in 1..lengths.len() {
        if lengths[idx] != lengths[idx - 1] {
            runs.push((start, idx));
            start = idx;
        }
    }
    if start < lengths.len() {
        runs.push((start, lengths.len()));
    }

    runs
}

/// A run of equal length records, borrowed from the buffer of a [`RaggedList`]
#[derive(Debug, Clone, Copy)]
pub struct RaggedBlock<'a> {
    bytes: &'a [u8],
    record_length: usize,
    width: usize,
    layout: RaggedLayout,
}

impl<'a> RaggedBlock<'a> {
    /// number of records in the run
    pub fn len(&self) -> usize {
        self.bytes.len() / self.record_length
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// number of list entries in every record of the run
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn cell_type(&self) -> CellType {
        CellType::from_count(self.width)
    }

    /// the raw bytes of every record
    pub fn records(&self) -> std::slice::ChunksExact<'a, u8> {
        self.bytes.chunks_exact(self.record_length)
    }

    /// copy the list entries out as a `(len, width)` array
    pub fn to_array(&self) -> Result<DynArray, BodyError> {
        let array = with_scalar_type!(self.layout.data, T => {
            with_byte_order!(self.layout.endian, B => DynArray::from(self.copy_entries::<T, B>()?))
        });
        Ok(array)
    }

    /// copy the list entries into a cell block tagged by the run's width
    pub fn to_cell_block(&self) -> Result<CellBlock, Error> {
        let block = CellBlock::new(self.cell_type(), self.to_array()?)?;
        Ok(block)
    }

    /// copy a fixed width field of every record into a 1 dimensional array
    pub fn scalar_column(
        &self,
        position: FieldPosition,
        dtype: Dtype,
    ) -> Result<DynArray, BodyError> {
        let offset = match position {
            FieldPosition::Prefix(offset) => offset,
            FieldPosition::Suffix(offset) => self.record_length - self.layout.suffix + offset,
        };

        let mut column = new_column(dtype, self.len());
        for record in self.records() {
            column.push_bytes(&record[offset..offset + dtype.size()], self.layout.endian);
        }

        column.finish(&[self.len()])
    }

    fn copy_entries<T: Scalar, B: ByteOrder>(&self) -> Result<Array2<T>, BodyError> {
        let start = self.layout.data_start();
        let end = start + self.width * T::DTYPE.size();

        let mut values = Vec::with_capacity(self.len() * self.width);
        for record in self.records() {
            values.extend(
                record[start..end]
                    .chunks_exact(T::DTYPE.size())
                    .map(T::read::<B>),
            );
        }

        Ok(Array2::from_shape_vec((self.len(), self.width), values)?)
    }
}

/// Decode `num_records` ragged records at the start of `buffer` into cell blocks.
///
/// Returns the number of bytes consumed alongside one block per run of equal
/// record length, in file order.
pub fn decode(
    buffer: &[u8],
    layout: RaggedLayout,
    num_records: usize,
) -> Result<(usize, Vec<CellBlock>), Error> {
    let list = RaggedList::scan(buffer, layout, num_records)?;
    let blocks = list
        .blocks()
        .map(|block| block.to_cell_block())
        .collect::<Result<Vec<_>, _>>()?;

    Ok((list.consumed(), blocks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    /// encode rows as `uint8` counts followed by `int32` entries
    fn encode_le(rows: &[Vec<i32>]) -> Vec<u8> {
        let mut out = Vec::new();
        for row in rows {
            out.push(row.len() as u8);
            for value in row {
                out.extend_from_slice(&value.to_le_bytes());
            }
        }
        out
    }

    fn rows_with_lengths(lengths: &[usize]) -> Vec<Vec<i32>> {
        let mut next = 0;
        lengths
            .iter()
            .map(|&len| {
                (0..len)
                    .map(|_| {
                        next += 1;
                        next
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn mixed_lengths() {
        let rows = rows_with_lengths(&[3, 3, 3, 4, 4, 5]);
        let mut buffer = encode_le(&rows);
        let expected_len = buffer.len();
        // trailing bytes of some later element
        buffer.extend_from_slice(&[0xff; 7]);

        let layout = RaggedLayout::new(Dtype::UInt8, Dtype::Int32, Endianness::Little);
        let (consumed, blocks) = decode(&buffer, layout, rows.len()).unwrap();

        assert_eq!(consumed, expected_len);
        assert_eq!(blocks.len(), 3);

        let types: Vec<_> = blocks.iter().map(|b| b.cell_type().clone()).collect();
        assert_eq!(
            types,
            [CellType::Triangle, CellType::Quad, CellType::Polygon(5)]
        );

        let lens: Vec<_> = blocks.iter().map(CellBlock::len).collect();
        assert_eq!(lens, [3, 2, 1]);

        assert_eq!(
            blocks[1].data(),
            &DynArray::new(array![[10i32, 11, 12, 13], [14, 15, 16, 17]])
        );
    }

    #[test]
    fn repeated_lengths_are_separate_runs() {
        let rows = rows_with_lengths(&[3, 4, 3]);
        let buffer = encode_le(&rows);
        let layout = RaggedLayout::new(Dtype::UInt8, Dtype::Int32, Endianness::Little);
        let (_, blocks) = decode(&buffer, layout, rows.len()).unwrap();

        assert_eq!(blocks.len(), 3);
    }

    #[test]
    fn empty_list() {
        let layout = RaggedLayout::new(Dtype::UInt8, Dtype::Int32, Endianness::Little);
        let (consumed, blocks) = decode(&[], layout, 0).unwrap();
        assert_eq!(consumed, 0);
        assert!(blocks.is_empty());
    }

    #[test]
    fn big_endian_counts() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&2u16.to_be_bytes());
        buffer.extend_from_slice(&7u32.to_be_bytes());
        buffer.extend_from_slice(&9u32.to_be_bytes());

        let layout = RaggedLayout::new(Dtype::UInt16, Dtype::UInt32, Endianness::Big);
        let (consumed, blocks) = decode(&buffer, layout, 1).unwrap();

        assert_eq!(consumed, 10);
        assert_eq!(blocks[0].cell_type(), &CellType::Line);
        assert_eq!(blocks[0].data(), &DynArray::new(array![[7u32, 9]]));
    }

    #[test]
    fn truncated_record() {
        let rows = rows_with_lengths(&[3, 3]);
        let buffer = encode_le(&rows);
        let layout = RaggedLayout::new(Dtype::UInt8, Dtype::Int32, Endianness::Little);

        let out = RaggedList::scan(&buffer[..buffer.len() - 1], layout, 2);
        assert!(matches!(
            out,
            Err(BodyError::TruncatedRecord { record: 1, .. })
        ));

        // more records requested than present
        let out = RaggedList::scan(&buffer, layout, 3);
        assert!(matches!(
            out,
            Err(BodyError::TruncatedRecord { record: 2, .. })
        ));
    }

    #[test]
    fn negative_count() {
        let buffer = [0xffu8, 0, 0, 0, 0];
        let layout = RaggedLayout::new(Dtype::Int8, Dtype::Int32, Endianness::Little);
        let out = RaggedList::scan(&buffer, layout, 1);
        assert!(matches!(out, Err(BodyError::InvalidListCount(_))));
    }

    #[test]
    fn padded_records() {
        // [flag: u8][count: u8][entries: u16 * count][weight: f32]
        let mut buffer = Vec::new();
        for (flag, entries, weight) in [(1u8, vec![0u16, 1, 2], 0.5f32), (2, vec![2, 3, 4], 1.5)] {
            buffer.push(flag);
            buffer.push(entries.len() as u8);
            for entry in entries {
                buffer.extend_from_slice(&entry.to_le_bytes());
            }
            buffer.extend_from_slice(&weight.to_le_bytes());
        }

        let layout = RaggedLayout::new(Dtype::UInt8, Dtype::UInt16, Endianness::Little)
            .with_padding(1, 4);
        let list = RaggedList::scan(&buffer, layout, 2).unwrap();
        assert_eq!(list.consumed(), buffer.len());

        let blocks: Vec<_> = list.blocks().collect();
        assert_eq!(blocks.len(), 1);

        let block = blocks[0];
        assert_eq!(block.len(), 2);
        assert_eq!(block.width(), 3);
        assert_eq!(
            block.to_array().unwrap(),
            DynArray::new(array![[0u16, 1, 2], [2, 3, 4]])
        );
        assert_eq!(
            block
                .scalar_column(FieldPosition::Prefix(0), Dtype::UInt8)
                .unwrap(),
            DynArray::from_vec(vec![1u8, 2])
        );
        assert_eq!(
            block
                .scalar_column(FieldPosition::Suffix(0), Dtype::Float32)
                .unwrap(),
            DynArray::from_vec(vec![0.5f32, 1.5])
        );
    }

    proptest! {
        #[test]
        fn blocks_cover_every_row(lengths in proptest::collection::vec(0usize..7, 0..40)) {
            let rows = rows_with_lengths(&lengths);
            let buffer = encode_le(&rows);
            let layout = RaggedLayout::new(Dtype::UInt8, Dtype::Int32, Endianness::Little);
            let (consumed, blocks) = decode(&buffer, layout, rows.len()).unwrap();

            prop_assert_eq!(consumed, buffer.len());

            // neighbouring blocks always differ in width
            for pair in blocks.windows(2) {
                prop_assert_ne!(pair[0].width(), pair[1].width());
            }

            let mut decoded = Vec::new();
            for block in &blocks {
                let data = block.data().view::<i32>().unwrap();
                for row in data.outer_iter() {
                    decoded.push(row.iter().copied().collect::<Vec<_>>());
                }
            }
            prop_assert_eq!(decoded, rows);
        }
    }
}
