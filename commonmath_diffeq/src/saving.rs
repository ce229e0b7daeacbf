//! Result storage for the integrators.
//!
//! Accepted samples are either kept in memory, streamed to a CSV file as they are produced,
//! or dropped. Streaming storage keeps every sample accepted before a failed run.

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use csv::Writer;

use crate::{IntegrationError, rk::Stats, state::OdeState};

/// Specifies the saving strategy to be used by the solver.
#[derive(Clone, Debug, Default)]
pub enum SaveMethod {
    /// Save every accepted sample in memory.
    #[default]
    Memory,
    /// Stream every accepted sample to the CSV file at this path.
    File(PathBuf),
    /// Do not save solver output.
    None,
}

/// Runtime storage for solver results, selected based on the `SaveMethod`.
#[derive(Debug)]
pub enum ResultStorage<State: OdeState> {
    Memory(MemoryResult<State>),
    File(StateWriter),
    None,
}

impl<State: OdeState> ResultStorage<State> {
    pub fn new(save_method: &SaveMethod) -> Result<Self, IntegrationError> {
        Ok(match save_method {
            SaveMethod::Memory => ResultStorage::Memory(MemoryResult::new()),
            SaveMethod::File(path) => ResultStorage::File(StateWriter::create(path)?),
            SaveMethod::None => ResultStorage::None,
        })
    }

    /// Save a `(time, state)` pair to the result store.
    pub fn save(&mut self, t: f64, y: &State) -> Result<(), IntegrationError> {
        match self {
            ResultStorage::Memory(result) => {
                result.insert(t, y);
                Ok(())
            }
            ResultStorage::File(writer) => writer.write(t, y),
            ResultStorage::None => Ok(()),
        }
    }

    /// Flushes any buffered file output.
    pub fn flush(&mut self) -> Result<(), IntegrationError> {
        if let ResultStorage::File(writer) = self {
            writer.flush()?;
        }
        Ok(())
    }

    /// Number of samples kept in memory. Zero for file and no storage.
    pub fn len(&self) -> usize {
        match self {
            ResultStorage::Memory(result) => result.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_memory(self) -> Option<MemoryResult<State>> {
        match self {
            ResultStorage::Memory(result) => Some(result),
            _ => None,
        }
    }
}

/// Accepted samples of a run, in time order.
#[derive(Clone, Debug)]
pub struct MemoryResult<State: OdeState> {
    /// Recorded times.
    pub t: Vec<f64>,
    /// Recorded states.
    pub y: Vec<State>,
}

impl<State: OdeState> Default for MemoryResult<State> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State: OdeState> MemoryResult<State> {
    pub fn new() -> Self {
        Self { t: Vec::new(), y: Vec::new() }
    }

    fn insert(&mut self, t: f64, y: &State) {
        self.t.push(t);
        self.y.push(y.clone());
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

/// The outcome of a completed integration run.
#[derive(Clone, Debug)]
pub struct Solution<State: OdeState> {
    /// Times of the accepted samples, strictly increasing. Empty unless saved in memory.
    pub t: Vec<f64>,
    /// States of the accepted samples. Empty unless saved in memory.
    pub y: Vec<State>,
    pub stats: Stats,
}

impl<State: OdeState> Solution<State> {
    pub fn new(result: ResultStorage<State>, stats: Stats) -> Self {
        let MemoryResult { t, y } = result.into_memory().unwrap_or_default();
        Self { t, y, stats }
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn first(&self) -> Option<(f64, &State)> {
        Some((*self.t.first()?, self.y.first()?))
    }

    pub fn last(&self) -> Option<(f64, &State)> {
        Some((*self.t.last()?, self.y.last()?))
    }

    pub fn final_state(&self) -> Option<&State> {
        self.y.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &State)> {
        self.t.iter().copied().zip(self.y.iter())
    }

    /// Writes all samples to a CSV file at `path`, one row per sample.
    pub fn write_csv(&self, path: &Path) -> Result<(), IntegrationError> {
        let mut writer = StateWriter::create(path)?;
        for (t, y) in self.iter() {
            writer.write(t, y)?;
        }
        writer.flush()
    }
}

/// Streams `(time, state)` rows to a CSV file. The header row is taken from the first state
/// written.
#[derive(Debug)]
pub struct StateWriter {
    writer: Writer<BufWriter<File>>,
    record: Vec<String>,
    headers_written: bool,
}

impl StateWriter {
    pub fn create(path: &Path) -> Result<Self, IntegrationError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Self {
            writer: Writer::from_writer(BufWriter::new(file)),
            record: Vec::new(),
            headers_written: false,
        })
    }

    pub fn write<State: OdeState>(&mut self, t: f64, y: &State) -> Result<(), IntegrationError> {
        if !self.headers_written {
            self.writer.write_record(y.headers())?;
            self.headers_written = true;
        }
        y.write_record(t, &mut self.record);
        self.writer.write_record(&self.record)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), IntegrationError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::state_array::StateArray;

    #[test]
    fn test_memory_storage() {
        let mut storage = ResultStorage::<f64>::new(&SaveMethod::Memory).unwrap();
        storage.save(0.0, &1.0).unwrap();
        storage.save(0.5, &2.0).unwrap();
        assert_eq!(storage.len(), 2);

        let solution = Solution::new(storage, Stats::default());
        assert_eq!(solution.first(), Some((0.0, &1.0)));
        assert_eq!(solution.last(), Some((0.5, &2.0)));
        assert_eq!(solution.final_state(), Some(&2.0));
    }

    #[test]
    fn test_no_storage() {
        let mut storage = ResultStorage::<f64>::new(&SaveMethod::None).unwrap();
        storage.save(0.0, &1.0).unwrap();
        assert!(storage.is_empty());
        let solution = Solution::new(storage, Stats::default());
        assert!(solution.is_empty());
        assert_eq!(solution.last(), None);
    }

    #[test]
    fn test_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("result.csv");

        let mut storage =
            ResultStorage::<StateArray<2>>::new(&SaveMethod::File(path.clone())).unwrap();
        storage.save(0.0, &StateArray::new([1.0, 0.0])).unwrap();
        storage.save(0.125, &StateArray::new([0.5, -0.25])).unwrap();
        storage.flush().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["t,y[0],y[1]", "0,1,0", "0.125,0.5,-0.25"]);
    }

    #[test]
    fn test_solution_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scalar.csv");

        let solution = Solution {
            t: vec![0.0, 1.0],
            y: vec![2.0, 4.0],
            stats: Stats::default(),
        };
        solution.write_csv(&path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<&str> = reader.headers().unwrap().iter().collect();
        assert_eq!(headers, vec!["t", "y"]);
        let rows: Vec<Vec<f64>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(|v| v.parse().unwrap()).collect())
            .collect();
        assert_eq!(rows, vec![vec![0.0, 2.0], vec![1.0, 4.0]]);
    }
}
