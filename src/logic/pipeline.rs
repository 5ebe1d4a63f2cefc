//! Pipeline Driver
//!
//! assemble → clean → split, each stage talking to the next only through
//! the files named in the config.

use serde::{Deserialize, Serialize};

use crate::logic::config::PipelineConfig;
use crate::logic::dataset::{
    AssemblyReport, CleanReport, DatasetAssembler, DatasetResult, DatasetSplitter, SplitManifest,
};
use crate::logic::features::CharacterCategories;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub assembly: AssemblyReport,
    pub clean: CleanReport,
    pub manifest: SplitManifest,
}

pub struct Pipeline {
    config: PipelineConfig,
    categories: CharacterCategories,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            categories: CharacterCategories::standard(),
        }
    }

    pub fn assemble(&self) -> DatasetResult<AssemblyReport> {
        self.config.validate()?;
        let assembler = DatasetAssembler::new(&self.categories, self.config.worker_count());
        assembler.assemble_all(&self.config.sources, &self.config.outputs.combined)
    }

    pub fn clean(&self) -> DatasetResult<CleanReport> {
        DatasetAssembler::clean(&self.config.outputs.combined)
    }

    pub fn split(&self) -> DatasetResult<SplitManifest> {
        self.config.validate()?;
        let splitter = DatasetSplitter::new(self.config.split, self.config.seed);
        let dataset = DatasetSplitter::load(&self.config.outputs.combined)?;
        let split = splitter.split(&dataset)?;
        splitter.write(&split, &self.config.outputs)
    }

    pub fn run(&self) -> DatasetResult<PipelineReport> {
        log::info!("Stage 1/3: assembling {} sources", self.config.sources.len());
        let assembly = self.assemble()?;

        log::info!("Stage 2/3: cleaning combined dataset");
        let clean = self.clean()?;

        log::info!("Stage 3/3: splitting (seed {})", self.config.seed);
        let manifest = self.split()?;

        Ok(PipelineReport { assembly, clean, manifest })
    }
}
