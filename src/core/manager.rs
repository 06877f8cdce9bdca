use actix::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::error::CrawlError;

/// 图集处理状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtlasStatus {
    Pending,
    Running,
    Completed,
    Failed(String),
}

/// ================== 图集元数据 ==================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasMeta {
    pub id: Uuid,
    pub url: String,
    pub status: AtlasStatus,
    pub images_saved: usize,
    pub images_failed: usize,
}

/// 整体统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    pub total: usize,
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub images_saved: usize,
    pub images_failed: usize,
}

impl CrawlStats {
    pub fn finished(&self) -> usize {
        self.completed + self.failed
    }
}

/// 登记新发现的图集
pub struct RegisterAtlas { pub task_id: Uuid, pub url: String }
impl Message for RegisterAtlas { type Result = (); }
impl Handler<RegisterAtlas> for CrawlManagerActor {
    type Result = ();
    fn handle(&mut self, msg: RegisterAtlas, _ctx: &mut Self::Context) {
        self.metas.insert(msg.task_id, AtlasMeta {
            id: msg.task_id,
            url: msg.url,
            status: AtlasStatus::Pending,
            images_saved: 0,
            images_failed: 0,
        });
    }
}

pub struct MarkAtlasRunning { pub task_id: Uuid }
impl Message for MarkAtlasRunning { type Result = (); }
impl Handler<MarkAtlasRunning> for CrawlManagerActor {
    type Result = ();
    fn handle(&mut self, msg: MarkAtlasRunning, _ctx: &mut Self::Context) {
        if let Some(meta) = self.metas.get_mut(&msg.task_id) {
            meta.status = AtlasStatus::Running;
        }
    }
}

pub struct ImageSaved { pub task_id: Uuid }
impl Message for ImageSaved { type Result = (); }
impl Handler<ImageSaved> for CrawlManagerActor {
    type Result = ();
    fn handle(&mut self, msg: ImageSaved, _ctx: &mut Self::Context) {
        if let Some(meta) = self.metas.get_mut(&msg.task_id) {
            meta.images_saved += 1;
        }
    }
}

pub struct ImageFailed { pub task_id: Uuid, pub error: CrawlError }
impl Message for ImageFailed { type Result = (); }
impl Handler<ImageFailed> for CrawlManagerActor {
    type Result = ();
    fn handle(&mut self, msg: ImageFailed, _ctx: &mut Self::Context) {
        log::debug!("图集 {} 图片失败: {}", msg.task_id, msg.error);
        if let Some(meta) = self.metas.get_mut(&msg.task_id) {
            meta.images_failed += 1;
        }
    }
}

pub struct MarkAtlasCompleted { pub task_id: Uuid }
impl Message for MarkAtlasCompleted { type Result = (); }
impl Handler<MarkAtlasCompleted> for CrawlManagerActor {
    type Result = ();
    fn handle(&mut self, msg: MarkAtlasCompleted, _ctx: &mut Self::Context) {
        if let Some(meta) = self.metas.get_mut(&msg.task_id) {
            meta.status = AtlasStatus::Completed;
        }
    }
}

pub struct MarkAtlasFailed { pub task_id: Uuid, pub error: CrawlError }
impl Message for MarkAtlasFailed { type Result = (); }
impl Handler<MarkAtlasFailed> for CrawlManagerActor {
    type Result = ();
    fn handle(&mut self, msg: MarkAtlasFailed, _ctx: &mut Self::Context) {
        if let Some(meta) = self.metas.get_mut(&msg.task_id) {
            meta.status = AtlasStatus::Failed(msg.error.to_string());
        }
    }
}

/// 查询整体统计
pub struct GetStats;
impl Message for GetStats { type Result = CrawlStats; }
impl Handler<GetStats> for CrawlManagerActor {
    type Result = MessageResult<GetStats>;
    fn handle(&mut self, _msg: GetStats, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.stats())
    }
}

/// 列出失败的图集
pub struct ListFailed;
impl Message for ListFailed { type Result = Vec<AtlasMeta>; }
impl Handler<ListFailed> for CrawlManagerActor {
    type Result = MessageResult<ListFailed>;
    fn handle(&mut self, _msg: ListFailed, _ctx: &mut Self::Context) -> Self::Result {
        let mut failed: Vec<AtlasMeta> = self
            .metas
            .values()
            .filter(|meta| matches!(meta.status, AtlasStatus::Failed(_)))
            .cloned()
            .collect();
        failed.sort_by(|a, b| a.url.cmp(&b.url));
        MessageResult(failed)
    }
}

impl Actor for CrawlManagerActor {
    type Context = Context<Self>;
}

/// 记录每个图集的处理状态，只保存在内存中
#[derive(Default)]
pub struct CrawlManagerActor {
    metas: HashMap<Uuid, AtlasMeta>,
}

impl CrawlManagerActor {
    pub fn new() -> Self {
        Self::default()
    }

    fn stats(&self) -> CrawlStats {
        let mut stats = CrawlStats { total: self.metas.len(), ..CrawlStats::default() };
        for meta in self.metas.values() {
            match meta.status {
                AtlasStatus::Pending => stats.pending += 1,
                AtlasStatus::Running => stats.running += 1,
                AtlasStatus::Completed => stats.completed += 1,
                AtlasStatus::Failed(_) => stats.failed += 1,
            }
            stats.images_saved += meta.images_saved;
            stats.images_failed += meta.images_failed;
        }
        stats
    }
}
