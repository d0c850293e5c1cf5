/// 以固定間隔交錯重排（可重現的假隨機順序）
///
/// 依序取出位置 `s, s+stride, s+2*stride, …`，`s` 從 0 到 `stride_count - 1`。
/// `stride_count` 為 0 或 1 時維持原順序。
#[must_use]
pub fn reorder<T>(items: Vec<T>, stride_count: usize) -> Vec<T> {
    let stride = stride_count.max(1);
    let len = items.len();
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(len);

    for offset in 0..stride.min(len) {
        for index in (offset..len).step_by(stride) {
            if let Some(item) = slots[index].take() {
                ordered.push(item);
            }
        }
    }

    ordered
}
