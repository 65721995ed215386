//! This module is for testing only

use std::rc::Rc;
use std::cell::RefCell;

pub type DropFlag<T> = Rc<RefCell<T>>;

pub struct Droppable {
    pub dropflag: DropFlag<bool>,
}

impl Drop for Droppable {
    fn drop(&mut self) {
        *self.dropflag.borrow_mut() = true;
    }
}

/// Element that counts its drops on a shared flag and panics when cloned past
/// its clone budget. With no budget set it clones freely.
pub struct Tracked {
    pub value: i32,
    pub drops: DropFlag<i32>,
    pub clones_left: DropFlag<i32>,
}

impl Tracked {
    pub fn new(value: i32, drops: &DropFlag<i32>) -> Tracked {
        Tracked {
            value,
            drops: drops.clone(),
            clones_left: DropFlag::new(RefCell::new(i32::MAX)),
        }
    }

    pub fn with_clone_budget(value: i32, drops: &DropFlag<i32>, clones_left: &DropFlag<i32>) -> Tracked {
        Tracked {
            value,
            drops: drops.clone(),
            clones_left: clones_left.clone(),
        }
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Tracked {
        {
            let mut left = self.clones_left.borrow_mut();
            if *left == 0 {
                panic!("clone budget exhausted");
            }
            *left -= 1;
        }
        Tracked {
            value: self.value,
            drops: self.drops.clone(),
            clones_left: self.clones_left.clone(),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        *self.drops.borrow_mut() += 1;
    }
}

#[test]
fn dropflag() {
    let flag = DropFlag::new(RefCell::new(false));
    let droppable = Droppable { dropflag: flag.clone() };
    assert_eq!(false, *flag.borrow());
    std::mem::drop(droppable);
    assert_eq!(true, *flag.borrow());
}

#[test]
fn tracked_counts_drops_and_enforces_budget() {
    let drops = DropFlag::new(RefCell::new(0));
    let budget = DropFlag::new(RefCell::new(1));
    {
        let item = Tracked::with_clone_budget(7, &drops, &budget);
        let copy = item.clone();
        assert_eq!(7, copy.value);
        assert_eq!(0, *budget.borrow());
    }
    assert_eq!(2, *drops.borrow());
}
