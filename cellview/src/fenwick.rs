use alloc::vec::Vec;

/// Prefix sums over `u64` values with `O(log n)` point updates and offset search.
#[derive(Clone, Debug)]
pub(crate) struct Fenwick {
    tree: Vec<u64>, // 1-indexed
    values: Vec<u64>,
    total: u64,
}

impl Default for Fenwick {
    fn default() -> Self {
        Self::from_values(Vec::new())
    }
}

impl Fenwick {
    pub(crate) fn from_values(values: Vec<u64>) -> Self {
        let n = values.len();
        let mut tree = alloc::vec![0u64; n + 1];
        let mut total = 0u64;
        for i in 1..=n {
            let v = values[i - 1];
            total = total.saturating_add(v);
            tree[i] = tree[i].saturating_add(v);
            let j = i + lsb(i);
            if j <= n {
                tree[j] = tree[j].saturating_add(tree[i]);
            }
        }
        Self {
            tree,
            values,
            total,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<u64> {
        self.values.get(index).copied()
    }

    pub(crate) fn total(&self) -> u64 {
        self.total
    }

    /// Overwrites the value at `index`. Out-of-range indexes are ignored.
    pub(crate) fn set(&mut self, index: usize, value: u64) {
        let Some(old) = self.values.get(index).copied() else {
            return;
        };
        if old == value {
            return;
        }
        self.values[index] = value;
        self.total = self.total - old + value;
        let n = self.len();
        let mut i = index + 1;
        while i <= n {
            self.tree[i] = self.tree[i] - old + value;
            i += lsb(i);
        }
    }

    pub(crate) fn push(&mut self, value: u64) {
        let i = self.len() + 1;
        // tree[i] covers the lsb(i) values ending at i.
        let covered_from = i - lsb(i);
        let before = self.prefix_sum(i - 1) - self.prefix_sum(covered_from);
        self.values.push(value);
        self.tree.push(before + value);
        self.total = self.total.saturating_add(value);
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        if len >= self.len() {
            return;
        }
        self.total = self.prefix_sum(len);
        self.values.truncate(len);
        self.tree.truncate(len + 1);
    }

    /// Sum of the first `count` values.
    pub(crate) fn prefix_sum(&self, count: usize) -> u64 {
        let mut i = count.min(self.len());
        let mut sum = 0u64;
        while i > 0 {
            sum = sum.saturating_add(self.tree[i]);
            i &= i - 1;
        }
        sum
    }

    /// Number of leading values whose running sum is `<= target`.
    ///
    /// With strictly positive values, this is the index of the value covering offset `target`.
    pub(crate) fn lower_bound(&self, mut target: u64) -> usize {
        let n = self.len();
        let mut idx = 0usize;
        let mut bit = highest_power_of_two_leq(n);
        while bit != 0 {
            let next = idx + bit;
            if next <= n && self.tree[next] <= target {
                target -= self.tree[next];
                idx = next;
            }
            bit >>= 1;
        }
        idx
    }
}

fn lsb(i: usize) -> usize {
    i & i.wrapping_neg()
}

fn highest_power_of_two_leq(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    1 << (usize::BITS - 1 - n.leading_zeros())
}
