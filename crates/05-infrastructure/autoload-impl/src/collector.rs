//! 顺序异步收集器
//!
//! 严格按顺序逐个访问工作项，上一个完成之后才开始下一个，
//! 后面的工作项可以依赖前面工作项产生的副作用

use std::future::Future;
use std::ops::ControlFlow;
use tracing::debug;

/// 单个工作项的收集结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collect<R> {
    /// 没有结果，跳过
    Skip,
    /// 单个结果
    One(R),
    /// 多个结果，展开后加入累积列表
    Many(Vec<R>),
}

impl<R> From<Option<R>> for Collect<R> {
    fn from(value: Option<R>) -> Self {
        value.map_or(Self::Skip, Self::One)
    }
}

impl<R> From<Vec<R>> for Collect<R> {
    fn from(values: Vec<R>) -> Self {
        Self::Many(values)
    }
}

/// 顺序执行并收集结果
///
/// 任何一项失败时整个遍历以该错误结束，已完成的工作项不会撤销
pub async fn execute_and_collect_each<I, F, Fut, R, E>(items: I, mut f: F) -> Result<Vec<R>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<Collect<R>, E>>,
{
    let mut collected = Vec::new();

    for item in items {
        match f(item).await? {
            Collect::Skip => {}
            Collect::One(result) => collected.push(result),
            Collect::Many(results) => collected.extend(results),
        }
    }

    Ok(collected)
}

/// 顺序执行每一项
///
/// 回调返回 [`ControlFlow::Break`] 时立即停止遍历
pub async fn execute_each<I, F, Fut, E>(items: I, mut f: F) -> Result<(), E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<ControlFlow<()>, E>>,
{
    for (index, item) in items.into_iter().enumerate() {
        if f(item).await?.is_break() {
            debug!("遍历在第 {} 项提前结束", index);
            break;
        }
    }

    Ok(())
}
