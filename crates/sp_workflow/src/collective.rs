// crates/sp_workflow/src/collective.rs

//! 工作者组
//!
//! 固定数量的工作者，0 号为协调者。协调者扫描并分配河段，
//! 通过广播把分配结果交给所有成员；报告前所有成员在屏障处同步。

use parking_lot::Mutex;
use sp_core::partition::ReachAssignment;
use std::sync::{Arc, Barrier};

/// 协调者编号
pub const ROOT: usize = 0;

/// 工作者组接口
pub trait Collective: Send + Sync {
    /// 本成员编号
    fn rank(&self) -> usize;

    /// 成员数量
    fn size(&self) -> usize;

    /// 广播分配结果
    ///
    /// 协调者传入自己的分配（引导失败时为 `None`），其他成员的参数被忽略。
    /// 所有成员得到协调者传入的值。
    fn broadcast_assignment(&self, assignment: Option<ReachAssignment>) -> Option<ReachAssignment>;

    /// 屏障同步
    fn barrier(&self);

    /// 是否为协调者
    fn is_root(&self) -> bool {
        self.rank() == ROOT
    }
}

/// 单成员组
#[derive(Debug, Clone, Copy, Default)]
pub struct SoloGroup;

impl Collective for SoloGroup {
    fn rank(&self) -> usize {
        ROOT
    }

    fn size(&self) -> usize {
        1
    }

    fn broadcast_assignment(&self, assignment: Option<ReachAssignment>) -> Option<ReachAssignment> {
        assignment
    }

    fn barrier(&self) {}
}

struct Shared {
    size: usize,
    barrier: Barrier,
    slot: Mutex<Option<ReachAssignment>>,
}

/// 进程内线程组
///
/// 每个成员运行在一个作用域线程中，共享一个屏障和一个广播槽。
pub struct ThreadGroup {
    rank: usize,
    shared: Arc<Shared>,
}

impl ThreadGroup {
    /// 创建 `size` 个成员句柄
    pub fn members(size: usize) -> Vec<ThreadGroup> {
        let shared = Arc::new(Shared {
            size,
            barrier: Barrier::new(size),
            slot: Mutex::new(None),
        });
        (0..size)
            .map(|rank| ThreadGroup {
                rank,
                shared: Arc::clone(&shared),
            })
            .collect()
    }

    /// 每个成员一个线程运行 `f`，按编号返回结果
    pub fn run<F, T>(size: usize, f: F) -> Vec<T>
    where
        F: Fn(ThreadGroup) -> T + Sync,
        T: Send,
    {
        let f = &f;
        std::thread::scope(|scope| {
            let handles: Vec<_> = Self::members(size)
                .into_iter()
                .map(|member| scope.spawn(move || f(member)))
                .collect();

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(value) => value,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }
}

impl Collective for ThreadGroup {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn broadcast_assignment(&self, assignment: Option<ReachAssignment>) -> Option<ReachAssignment> {
        if self.is_root() {
            *self.shared.slot.lock() = assignment;
        }
        self.shared.barrier.wait();
        let received = self.shared.slot.lock().clone();
        // 所有成员读完后才允许下一次写入
        self.shared.barrier.wait();
        received
    }

    fn barrier(&self) {
        self.shared.barrier.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_core::partition::partition;

    #[test]
    fn test_solo_group() {
        let group = SoloGroup;
        assert!(group.is_root());
        assert_eq!(group.size(), 1);

        let assignment = partition(vec!["a_1", "b_1"], 1).unwrap();
        assert_eq!(group.broadcast_assignment(Some(assignment.clone())), Some(assignment));
        assert_eq!(group.broadcast_assignment(None), None);
        group.barrier();
    }

    #[test]
    fn test_thread_group_broadcast() {
        let assignment = partition(vec!["a_1", "b_1", "c_1", "d_1", "e_1"], 3).unwrap();

        let received = ThreadGroup::run(3, |group| {
            let offered = group.is_root().then(|| assignment.clone());
            let got = group.broadcast_assignment(offered);
            group.barrier();
            (group.rank(), group.size(), got)
        });

        assert_eq!(received.len(), 3);
        for (rank, (r, size, got)) in received.into_iter().enumerate() {
            assert_eq!(r, rank);
            assert_eq!(size, 3);
            assert_eq!(got.as_ref(), Some(&assignment));
        }
    }

    #[test]
    fn test_thread_group_broadcast_failure() {
        let received = ThreadGroup::run(2, |group| group.broadcast_assignment(None));
        assert_eq!(received, vec![None, None]);
    }
}
