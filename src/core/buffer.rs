use crate::error::{DemoError, Result};

/// 缓冲区的绑定目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    /// 顶点属性
    Array,
    /// 顶点索引
    ElementArray,
    /// 着色器可读的结构化数据（实例变换等）
    ShaderStorage,
}

/// 带类型的数据缓冲区，独占其存储
#[derive(Debug)]
pub struct Buffer<T> {
    target: BufferTarget,
    data: Vec<T>,
}

impl<T: Copy + Default> Buffer<T> {
    /// 以初始数据创建缓冲区
    pub fn new(target: BufferTarget, data: &[T]) -> Self {
        Self {
            target,
            data: data.to_vec(),
        }
    }

    /// 创建指定长度、以默认值填充的缓冲区
    pub fn with_len(target: BufferTarget, len: usize) -> Self {
        Self {
            target,
            data: vec![T::default(); len],
        }
    }

    pub fn target(&self) -> BufferTarget {
        self.target
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 替换整个缓冲区内容（允许改变长度）
    pub fn set_data(&mut self, data: &[T]) {
        self.data.clear();
        self.data.extend_from_slice(data);
    }

    /// 从 `offset` 开始覆盖写入一段数据
    pub fn set_sub_data(&mut self, offset: usize, data: &[T]) -> Result<()> {
        let range = self.checked_range(offset, data.len())?;
        self.data[range].copy_from_slice(data);
        Ok(())
    }

    /// 从 `offset` 开始读出 `out.len()` 个元素
    pub fn get_sub_data(&self, offset: usize, out: &mut [T]) -> Result<()> {
        let range = self.checked_range(offset, out.len())?;
        out.copy_from_slice(&self.data[range]);
        Ok(())
    }

    /// 写映射：直接修改缓冲区内容
    pub fn map(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    fn checked_range(&self, offset: usize, count: usize) -> Result<std::ops::Range<usize>> {
        match offset.checked_add(count) {
            Some(end) if end <= self.data.len() => Ok(offset..end),
            _ => Err(DemoError::BufferRange {
                offset,
                count,
                len: self.data.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_data_writes_and_reads_back() {
        let mut buffer = Buffer::<u32>::with_len(BufferTarget::Array, 6);
        buffer.set_sub_data(2, &[7, 8, 9]).unwrap();

        let mut out = [0u32; 4];
        buffer.get_sub_data(1, &mut out).unwrap();
        assert_eq!(out, [0, 7, 8, 9]);
    }

    #[test]
    fn out_of_range_access_is_rejected() {
        let mut buffer = Buffer::new(BufferTarget::ElementArray, &[1u32, 2, 3]);
        assert!(matches!(
            buffer.set_sub_data(2, &[1, 2]),
            Err(DemoError::BufferRange { offset: 2, count: 2, len: 3 })
        ));
        let mut out = [0u32; 1];
        assert!(buffer.get_sub_data(usize::MAX, &mut out).is_err());
    }

    #[test]
    fn map_modifies_contents_in_place() {
        let mut buffer = Buffer::new(BufferTarget::ShaderStorage, &[1.0f32, 2.0]);
        for value in buffer.map() {
            *value *= 10.0;
        }
        assert_eq!(buffer.as_slice(), &[10.0, 20.0]);
        assert_eq!(buffer.target(), BufferTarget::ShaderStorage);
    }
}
